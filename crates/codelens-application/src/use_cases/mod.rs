mod call_graph;
mod file_outline;
mod gate;
mod get_indexing_status;
mod list_codebases;
mod manage_index;
mod read_file;
mod search_codebase;

pub use call_graph::{CallGraphOutcome, CallGraphRequest, CallGraphUseCase};
pub use file_outline::{FileOutlineOutcome, FileOutlineRequest, FileOutlineUseCase, ResolveMode};
pub use gate::{AccessGate, RecoveryDecision, check_access, decide_recovery};
pub use get_indexing_status::{GetIndexingStatusOutcome, GetIndexingStatusUseCase};
pub use list_codebases::{ListCodebasesOutcome, ListCodebasesUseCase};
pub use manage_index::{
    ManageIndexAction, ManageIndexOutcome, ManageIndexRequest, ManageIndexUseCase, recover_stale_indexing,
};
pub use read_file::ReadFileUseCase;
pub use search_codebase::{SearchCodebaseOutcome, SearchCodebaseUseCase};
