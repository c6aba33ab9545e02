//! CLI Exit Code Registry
//!
//! Single source of truth for `precon` exit codes. Schedulers and wrapper
//! scripts branch on these, so they are part of the shell contract.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, unreadable input file)    |
//! | 3    | Delivery incomplete, waiting for files               |
//! | 4    | Error records present and `--fail-on-errors` was set |
//! | 5    | Invalid config                                       |
//! | 6    | Trigger event invalid                                |
//! | 7    | Input file load/parse failure                        |
//! | 8    | Object store failure                                 |
//! | 9    | Queue or table write failure                         |
//!
//! New codes go at the end; existing numbers never change meaning.

use partner_recon::ReconError;

use crate::error::PipelineError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Command completed.
pub const EXIT_SUCCESS: u8 = 0;

/// Unspecified failure. Prefer a specific code.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Job (3-9)
// =============================================================================

/// Not every file of the day has arrived. Nothing was written; rerun later.
pub const EXIT_WAITING: u8 = 3;

/// Run completed but produced error records (only with `--fail-on-errors`).
pub const EXIT_ERRORS_FOUND: u8 = 4;

pub const EXIT_INVALID_CONFIG: u8 = 5;

pub const EXIT_EVENT_INVALID: u8 = 6;

/// Missing column, unparseable amount, malformed CSV.
pub const EXIT_INPUT_INVALID: u8 = 7;

pub const EXIT_STORAGE: u8 = 8;

/// Queue send or table write failed. Earlier dispatches may have landed.
pub const EXIT_DISPATCH: u8 = 9;

/// Map a pipeline failure to its exit code.
pub fn pipeline_exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::Event(_) => EXIT_EVENT_INVALID,
        PipelineError::Storage(_) => EXIT_STORAGE,
        PipelineError::Queue(_) | PipelineError::Table(_) => EXIT_DISPATCH,
        PipelineError::Recon(e) => recon_exit_code(e),
    }
}

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::MissingColumn { .. } | ReconError::AmountParse { .. } | ReconError::Csv { .. } => {
            EXIT_INPUT_INVALID
        }
    }
}
