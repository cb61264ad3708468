//! Declarative macros for ergonomic effect construction
//!
//! Calls into injected services all look the same: await a fallible future,
//! turn success into a follow-up action and turn failure into either an
//! action or nothing. [`async_call!`](crate::async_call) spells that out once.

/// Create an `Effect::Future` around a fallible async call
///
/// The call expression is evaluated inside an `async move` block, so it must
/// own everything it touches (clone `Arc`s before the macro).
///
/// # Example
///
/// ```
/// use prioritize_core::{async_call, effect::Effect};
///
/// #[derive(Debug)]
/// enum Action {
///     Loaded(Vec<u32>),
/// }
///
/// async fn fetch() -> Result<Vec<u32>, String> {
///     Ok(vec![1, 2, 3])
/// }
///
/// let effect: Effect<Action> = async_call! {
///     call: fetch(),
///     on_success: |items| Some(Action::Loaded(items)),
///     on_error: |_error| None,
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_call {
    (
        call: $call:expr,
        on_success: |$success_param:pat_param| $success_body:expr,
        on_error: |$error_param:pat_param| $error_body:expr $(,)?
    ) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move {
            match $call.await {
                ::std::result::Result::Ok($success_param) => $success_body,
                ::std::result::Result::Err($error_param) => $error_body,
            }
        }))
    };
}
