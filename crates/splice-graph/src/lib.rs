//! Procedures, joints, sites and the builder that links descriptions into
//! registered composites.

pub mod builder;
pub mod description;
pub mod evaluator;
pub mod host;
pub mod procedure;
pub mod site;

pub use builder::GraphBuilder;
pub use description::{
    load_description, parse_description, DescriptionFormat, JointDescription,
    ProcedureDescription, WireDescription,
};
pub use evaluator::RunOptions;
pub use host::run_raw;
pub use procedure::{Body, Composite, Joint, JointId, Procedure, Wire};
pub use site::{Site, SiteFactory, UNLIMITED};
