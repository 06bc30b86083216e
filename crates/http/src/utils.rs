/// Returns early with `$error` unless `$predicate` holds.
///
/// ```ignore
/// ensure!(path.len() <= HTTP_PATH_MAX, ParseError::too_long_line(LineKind::Path, HTTP_PATH_MAX));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
