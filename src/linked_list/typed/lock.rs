use core::ops::{Deref, DerefMut};
#[cfg(feature = "std")]
use core::sync::atomic::{AtomicUsize, Ordering};

use spin::{Mutex, MutexGuard};

use crate::error::LockError;

/// An exclusive lock that refuses to be taken twice by the same thread.
///
/// With the `std` feature the lock remembers which thread holds it, so a
/// second acquisition from that thread fails with [`LockError::Reentrant`]
/// instead of spinning forever. Without `std` there is no thread identity to
/// compare against and re-entry deadlocks.
pub(crate) struct CheckedLock<T> {
    inner: Mutex<T>,
    #[cfg(feature = "std")]
    owner: AtomicUsize,
}

/// Proof that the current thread holds a [`CheckedLock`].
pub(crate) struct CheckedGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    #[cfg(feature = "std")]
    owner: &'a AtomicUsize,
}

impl<T> CheckedLock<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            #[cfg(feature = "std")]
            owner: AtomicUsize::new(NO_OWNER),
        }
    }

    /// Blocks until the lock is acquired.
    #[cfg(feature = "std")]
    pub(crate) fn lock(&self) -> Result<CheckedGuard<'_, T>, LockError> {
        let me = current_thread();
        // Only the holder ever stores its own id here, so a match means this
        // thread is already inside the critical section.
        if self.owner.load(Ordering::Acquire) == me {
            return Err(LockError::Reentrant);
        }
        let guard = self.inner.lock();
        self.owner.store(me, Ordering::Release);
        Ok(CheckedGuard {
            guard,
            owner: &self.owner,
        })
    }

    /// Blocks until the lock is acquired.
    #[cfg(not(feature = "std"))]
    pub(crate) fn lock(&self) -> Result<CheckedGuard<'_, T>, LockError> {
        Ok(CheckedGuard {
            guard: self.inner.lock(),
        })
    }

    pub(crate) fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

impl<T> Deref for CheckedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<T> DerefMut for CheckedGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

#[cfg(feature = "std")]
impl<T> Drop for CheckedGuard<'_, T> {
    fn drop(&mut self) {
        // Runs before `guard` is dropped, so ownership is cleared while the
        // mutex is still held.
        self.owner.store(NO_OWNER, Ordering::Release);
    }
}

#[cfg(feature = "std")]
const NO_OWNER: usize = 0;

/// A non-zero id unique among live threads: the address of a thread local.
#[cfg(feature = "std")]
fn current_thread() -> usize {
    std::thread_local! {
        static MARKER: u8 = const { 0 };
    }
    MARKER.with(|marker| marker as *const u8 as usize)
}

#[cfg(all(test, feature = "std"))]
mod tests {
    extern crate std;

    use std::sync::Arc;
    use std::thread;

    use super::CheckedLock;
    use crate::error::LockError;

    #[test]
    fn test_relock_on_same_thread_is_reported() {
        let lock = CheckedLock::new(5);
        let guard = lock.lock().unwrap();
        assert_eq!(*guard, 5);
        assert_eq!(lock.lock().err(), Some(LockError::Reentrant));
        drop(guard);
        assert!(lock.lock().is_ok());
    }

    #[test]
    fn test_other_threads_wait_instead_of_failing() {
        let lock = Arc::new(CheckedLock::new(0usize));
        let mut handles = std::vec::Vec::new();
        for _ in 0..4 {
            let lock = Arc::clone(&lock);
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    *lock.lock().unwrap() += 1;
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*lock.lock().unwrap(), 4000);
    }
}
