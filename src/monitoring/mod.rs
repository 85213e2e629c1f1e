/*!
 * Monitoring Module
 * Tracing setup and operator-facing reports
 */

pub mod reporter;
pub mod tracer;

pub use reporter::{
    render_table, ControllerEvent, RecordingReporter, ReportFormat, Reporter, TableReport,
    TableReporter,
};
pub use tracer::{generate_run_id, init_tracing, RunSpan};
