//! Callback adapter for callers that cannot `.await`
//!
//! The async `AuthResult` API is the primitive; this only moves the outcome
//! into a completion closure.

use std::future::Future;

use authsync_domain::AuthResult;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Run `future` on `handle` and hand its outcome to `callback`.
///
/// ```no_run
/// use authsync_core::callback::spawn_with_callback;
/// use authsync_domain::AuthResult;
///
/// # fn demo(handle: tokio::runtime::Handle) {
/// spawn_with_callback(&handle, async { AuthResult::Ok(42) }, |result| {
///     println!("finished: {result:?}");
/// });
/// # }
/// ```
pub fn spawn_with_callback<T, Fut, F>(handle: &Handle, future: Fut, callback: F) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = AuthResult<T>> + Send + 'static,
    F: FnOnce(AuthResult<T>) + Send + 'static,
{
    handle.spawn(async move { callback(future.await) })
}

#[cfg(test)]
mod tests {
    use authsync_domain::AuthError;
    use tokio::sync::oneshot;

    use super::*;

    #[tokio::test]
    async fn test_callback_receives_success() {
        let (tx, rx) = oneshot::channel();
        spawn_with_callback(&Handle::current(), async { Ok("done") }, move |result| {
            let _ = tx.send(result);
        })
        .await
        .unwrap();

        assert_eq!(rx.await.unwrap().unwrap(), "done");
    }

    #[tokio::test]
    async fn test_callback_receives_error() {
        let (tx, rx) = oneshot::channel();
        spawn_with_callback(
            &Handle::current(),
            async { AuthResult::<()>::Err(AuthError::no_current_session()) },
            move |result| {
                let _ = tx.send(result);
            },
        )
        .await
        .unwrap();

        assert!(matches!(rx.await.unwrap(), Err(AuthError::Usage { .. })));
    }

    #[test]
    fn test_callback_from_outside_runtime() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        let join = spawn_with_callback(runtime.handle(), async { Ok(7_u32) }, move |result| {
            tx.send(result).unwrap();
        });
        runtime.block_on(join).unwrap();

        assert_eq!(rx.recv().unwrap().unwrap(), 7);
    }
}
