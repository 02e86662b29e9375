//! Import engine services
//!
//! One module per component, composed by [`crate::service::OrderImportService`]:
//! row parsing, identity resolution, order assembly, batch orchestration,
//! and lifecycle advancement.

pub mod batch_orchestrator;
pub mod identity_resolver;
pub mod lifecycle_driver;
pub mod order_assembler;
pub mod row_parser;

pub use batch_orchestrator::{BatchOrchestrator, BatchOutcome};
pub use identity_resolver::IdentityResolver;
pub use lifecycle_driver::{LifecycleDriver, LifecycleOutcome};
pub use order_assembler::OrderAssembler;
pub use row_parser::{ParsedRow, RowParser, RowWarning};
