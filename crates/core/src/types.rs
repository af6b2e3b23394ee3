/// Job identifiers assigned by the remote execution server.
///
/// A value of `0` is the server's sentinel for "submission rejected"
/// and is never a valid identifier.
pub type JobId = i64;
