/// Handle to the directory transaction a nigori update runs under.
///
/// The cryptographer passes it straight through to its nigori handler and
/// never inspects it.
pub trait BaseTransaction {}
