// an elastic optical network under dynamic traffic
// links carry a grid of spectrum slots, a lightpath takes the same contiguous
// slots on every link it crosses (spectrum continuity), and no slot is ever
// held by two lightpaths at once

/* data flow of one run
flow_generator -> event -> simulator -> control_plane -> routing <-> topology
                                                            |
                                                           qot */

pub mod control_plane;
pub mod event;
pub mod flow_generator;
pub mod lightpath;
pub mod modulation;
pub mod qot;
pub mod routing;
pub mod simulator;
pub mod topology;

pub use control_plane::{ControlPlane, Decision, DemandState, Outcome};
pub use event::{Event, EventKind, EventScheduler};
pub use flow_generator::{Demand, DemandId, FlowGenerator, TrafficClass, TrafficError};
pub use lightpath::{LightPath, PathRole};
pub use modulation::Modulation;
pub use qot::QotEstimator;
pub use routing::{Admission, AssignmentStrategy, BlockReason, StrategyKind};
pub use topology::{Link, LinkId, LightpathId, Node, NodeId, SlotRange, Topology, TopologyError};
