use narwhal_flow::{FlowError, FlowNetwork, MinCostFlowSolver, SuccessiveShortestPath, UNBOUNDED};

#[test]
fn ssp_prefers_the_cheaper_parallel_edge() {
    let mut net: FlowNetwork<&str, u32> = FlowNetwork::new();
    net.add_node("s", -4);
    net.add_node("t", 4);
    let cheap = net.add_edge("s", "t", 0, 0, 3, 1).unwrap();
    let dear = net.add_edge("s", "t", 1, 0, 10, 5).unwrap();

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(sol.flow(cheap), 3);
    assert_eq!(sol.flow(dear), 1);
    assert_eq!(sol.cost, 8);
    assert_eq!(net.check_solution(&sol), Ok(()));
}

#[test]
fn ssp_honors_lower_bounds() {
    let mut net: FlowNetwork<&str, &str> = FlowNetwork::new();
    net.add_node("s", -2);
    net.add_node("a", 0);
    net.add_node("t", 2);
    let sa = net.add_edge("s", "a", "sa", 1, 5, 1).unwrap();
    let at = net.add_edge("a", "t", "at", 0, 5, 1).unwrap();
    let st = net.add_edge("s", "t", "st", 0, 5, 3).unwrap();

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(sol.flows, vec![2, 2, 0]);
    assert_eq!((sol.flow(sa), sol.flow(at), sol.flow(st)), (2, 2, 0));
    assert_eq!(sol.cost, 4);
}

#[test]
fn ssp_forces_lower_bound_even_when_more_expensive() {
    let mut net: FlowNetwork<&str, &str> = FlowNetwork::new();
    net.add_node("s", -1);
    net.add_node("t", 1);
    net.add_edge("s", "t", "cheap", 0, 5, 0).unwrap();
    net.add_edge("s", "t", "forced", 1, 5, 7).unwrap();
    net.add_edge("t", "s", "back", 0, 5, 0).unwrap();

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(net.check_solution(&sol), Ok(()));
    assert_eq!(net.flow_of(&sol, &"s", &"t", &"forced"), Some(1));
    assert_eq!(sol.cost, 7);
}

#[test]
fn ssp_reports_infeasible_demand() {
    let mut net: FlowNetwork<&str, u32> = FlowNetwork::new();
    net.add_node("s", -5);
    net.add_node("t", 5);
    net.add_edge("s", "t", 0, 0, 3, 1).unwrap();

    assert_eq!(
        SuccessiveShortestPath.solve(&net),
        Err(FlowError::Infeasible { unmet: 2 })
    );
}

#[test]
fn ssp_reports_unbalanced_demands() {
    let mut net: FlowNetwork<&str, u32> = FlowNetwork::new();
    net.add_node("s", -3);
    net.add_node("t", 2);
    net.add_edge("s", "t", 0, 0, 3, 1).unwrap();

    assert_eq!(
        SuccessiveShortestPath.solve(&net),
        Err(FlowError::Unbalanced {
            supply: 3,
            demand: 2
        })
    );
}

#[test]
fn ssp_routes_surplus_through_zero_cost_bypass() {
    // Shape of a compaction network: one face between the split outer face.
    let mut net: FlowNetwork<&str, &str> = FlowNetwork::new();
    net.add_node("source", -UNBOUNDED);
    net.add_node("f", 0);
    net.add_node("end", UNBOUNDED);
    let up = net.add_edge("source", "f", "up", 1, UNBOUNDED, 1).unwrap();
    let down = net.add_edge("f", "end", "down", 1, UNBOUNDED, 1).unwrap();
    let bypass = net
        .add_edge("source", "end", "bypass", 0, UNBOUNDED, 0)
        .unwrap();

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(sol.flow(up), 1);
    assert_eq!(sol.flow(down), 1);
    assert_eq!(sol.flow(bypass), UNBOUNDED - 1);
    assert_eq!(sol.cost, 2);
}

#[test]
fn ssp_keeps_self_loops_at_their_lower_bound() {
    let mut net: FlowNetwork<&str, u32> = FlowNetwork::new();
    net.add_node("f", 0);
    let looped = net.add_edge("f", "f", 0, 1, UNBOUNDED, 1).unwrap();

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(sol.flow(looped), 1);
    assert_eq!(sol.cost, 1);
}

#[test]
fn ssp_is_deterministic() {
    let build = || {
        let mut net: FlowNetwork<u32, u32> = FlowNetwork::new();
        net.add_node(0, -6);
        net.add_node(3, 6);
        for (k, (s, t)) in [(0, 1), (0, 2), (1, 3), (2, 3), (1, 2)].into_iter().enumerate() {
            net.add_edge(s, t, k as u32, 0, 4, 1).unwrap();
        }
        net
    };
    let a = SuccessiveShortestPath.solve(&build()).unwrap();
    let b = SuccessiveShortestPath.solve(&build()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.cost, 12);
}

/// A chain feeding a hub that fans out again: the sink's distance drops many more times than
/// there are nodes, but no node is ever queued more than a handful of times.
#[test]
fn ssp_accepts_repeated_distance_drops() {
    let (k, r) = (8usize, 8usize);
    let mut net: FlowNetwork<String, usize> = FlowNetwork::new();
    net.add_node("s".to_string(), -1);
    for i in 1..=k {
        net.add_node(format!("x{i}"), 0);
    }
    net.add_node("hub".to_string(), 0);
    for j in 1..=r {
        net.add_node(format!("y{j}"), 0);
    }
    net.add_node("z".to_string(), 1);

    let mut key: usize = 0;
    let mut edge = |net: &mut FlowNetwork<String, usize>, from: String, to: String, cost: i64| {
        key += 1;
        net.add_edge(from, to, key, 0, 1, cost).unwrap()
    };
    edge(&mut net, "s".into(), "x1".into(), 0);
    for i in 1..k {
        edge(&mut net, format!("x{i}"), format!("x{}", i + 1), 0);
    }
    for i in 1..=k {
        edge(&mut net, format!("x{i}"), "hub".into(), 100 * (k - i) as i64);
    }
    for j in 1..=r {
        edge(&mut net, "hub".into(), format!("y{j}"), 0);
    }
    let mut last = 0;
    for j in 1..=r {
        last = edge(&mut net, format!("y{j}"), "z".into(), (r - j) as i64);
    }

    let sol = SuccessiveShortestPath.solve(&net).unwrap();
    assert_eq!(sol.cost, 0);
    assert_eq!(sol.flow(last), 1);
    assert_eq!(net.check_solution(&sol), Ok(()));
}

#[test]
fn ssp_reports_negative_cycles() {
    let mut net: FlowNetwork<&str, &str> = FlowNetwork::new();
    net.add_node("s", -1);
    net.add_node("a", 0);
    net.add_node("b", 0);
    net.add_node("t", 1);
    net.add_edge("s", "a", "sa", 0, 1, 0).unwrap();
    net.add_edge("a", "b", "ab", 0, 5, -1).unwrap();
    net.add_edge("b", "a", "ba", 0, 5, -1).unwrap();
    net.add_edge("b", "t", "bt", 0, 1, 0).unwrap();
    assert_eq!(
        SuccessiveShortestPath.solve(&net),
        Err(FlowError::NegativeCycle)
    );
}
