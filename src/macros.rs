//! Helper macros.

/// Dispatches one guarded call through a command set's raw table.
///
/// Expands to the pre-call check (unsupported when the entry point did
/// not resolve), a `trace!` of the arguments, the raw call, and the
/// post-call error drain. Must be used inside a function returning
/// [`Result`](../error/type.Result.html).
///
/// ```ignore
/// let name = command!(self, CreateShader, "glCreateShader", (stage));
/// ```
macro_rules! command {
    ($set:expr, $field:ident, $name:literal, ($($arg:expr),* $(,)?) $(,)?) => {
        {
            let set = &$set;
            set.guard.before($name, set.table.$field.is_loaded())?;
            trace!(target: "gl", concat!($name, "{:?}"), ($($arg,)*));
            #[allow(unused_unsafe)]
            let result = unsafe { set.table.$field($($arg),*) };
            set.guard.after($name)?;
            result
        }
    };
}
