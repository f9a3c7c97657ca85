#![allow(dead_code)]

use rmsa_sim::optical_network::{Demand, Link, Node, Topology};

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ring(n:usize,slots:usize,weight:f64) -> Topology {
    let nodes = (0..n).map(Node::new).collect();
    let links = (0..n).map(|i| Link::new(i, i, (i+1)%n, slots, 12.5, weight)).collect();
    Topology::new(nodes, links).unwrap()
}

pub fn demand(id:usize,source:usize,destination:usize,rate:f64,arrival:f64,departure:f64) -> Demand {
    Demand {id,source,destination,rate,holding_time:departure - arrival,arrival,departure}
}

// ring of `n` nodes with 100 km links, traffic and routing sections filled in
pub fn ring_config(n:usize,slots:usize,strategy:&str,seed:u64,launch_power_dbm:f64) -> String {
    let nodes:Vec<String> = (0..n).map(|i| format!(r#"{{"id":{i}}}"#)).collect();
    let links:Vec<String> = (0..n)
        .map(|i| format!(r#"{{"id":{i},"source":{i},"destination":{},"slots":{slots},"weight":100.0}}"#,(i+1)%n))
        .collect();
    format!(r#"{{
        "topology": {{"nodes":[{}],"links":[{}]}},
        "traffic": {{
            "classes": [
                {{"weight":3.0,"holding_time":1.0,"rate":100.0}},
                {{"weight":1.0,"holding_time":2.0,"rate":200.0}}
            ],
            "demands": 300,
            "load": 40.0,
            "max_rate": 200.0,
            "seed": {seed}
        }},
        "routing": {{"strategy":"{strategy}"}},
        "qot": {{"launch_power_dbm":{launch_power_dbm:.1}}}
    }}"#,nodes.join(","),links.join(","))
}
