use rubric_core::errors::{EvalError, EvalErrorKind};

pub const SUCCESS: i32 = 0;
/// Bad input: config, validation, unknown template.
pub const CONFIG_ERROR: i32 = 2;
/// The judge or its transport failed.
pub const INFRA_ERROR: i32 = 3;

pub fn for_error(err: &EvalError) -> i32 {
    match err.kind {
        EvalErrorKind::Validation | EvalErrorKind::NotFound | EvalErrorKind::BadRequest => {
            CONFIG_ERROR
        }
        _ => INFRA_ERROR,
    }
}
