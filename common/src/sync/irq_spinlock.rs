use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::irq::IrqControl;

/// IRQ-safe spinlock.
///
/// - Masks IRQs on lock
/// - Spins on a [`spin::Mutex`] until acquired
/// - Releases the mutex, then restores the IRQ state on drop
///
/// Holding it from task level keeps the interrupt vector from observing a
/// half-updated value. Not reentrant: an interrupt handler must never try to
/// take a lock that the code it interrupted may hold.
pub struct IrqSpinLock<T, I: IrqControl> {
    inner: spin::Mutex<T>,
    _irq: PhantomData<I>,
}

unsafe impl<T: Send, I: IrqControl> Send for IrqSpinLock<T, I> {}
unsafe impl<T: Send, I: IrqControl> Sync for IrqSpinLock<T, I> {}

impl<T, I: IrqControl> IrqSpinLock<T, I> {
    pub const fn new(data: T) -> Self {
        Self {
            inner: spin::Mutex::new(data),
            _irq: PhantomData,
        }
    }

    /// Acquire the lock with IRQs masked.
    pub fn lock(&self) -> IrqSpinLockGuard<'_, T, I> {
        let irq_state = I::disable();
        let guard = self.inner.lock();

        IrqSpinLockGuard {
            guard: Some(guard),
            irq_state,
            _irq: PhantomData,
        }
    }

    /// Try to acquire the lock once. IRQs are left untouched on failure.
    pub fn try_lock(&self) -> Option<IrqSpinLockGuard<'_, T, I>> {
        let irq_state = I::disable();
        match self.inner.try_lock() {
            Some(guard) => Some(IrqSpinLockGuard {
                guard: Some(guard),
                irq_state,
                _irq: PhantomData,
            }),
            None => {
                I::restore(irq_state);
                None
            }
        }
    }
}

/// Guard returned by [`IrqSpinLock::lock`].
pub struct IrqSpinLockGuard<'a, T, I: IrqControl> {
    // Taken in `drop` so the mutex is released before IRQs come back.
    guard: Option<spin::MutexGuard<'a, T>>,
    irq_state: I::State,
    _irq: PhantomData<I>,
}

impl<T, I: IrqControl> Deref for IrqSpinLockGuard<'_, T, I> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => guard,
            None => unreachable!("guard is only taken on drop"),
        }
    }
}

impl<T, I: IrqControl> DerefMut for IrqSpinLockGuard<'_, T, I> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.guard {
            Some(guard) => guard,
            None => unreachable!("guard is only taken on drop"),
        }
    }
}

impl<T, I: IrqControl> Drop for IrqSpinLockGuard<'_, T, I> {
    fn drop(&mut self) {
        drop(self.guard.take());
        I::restore(self.irq_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    static ENABLED: AtomicBool = AtomicBool::new(true);
    static DISABLE_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct FakeIrq;

    impl IrqControl for FakeIrq {
        type State = bool;

        fn disable() -> bool {
            DISABLE_CALLS.fetch_add(1, Ordering::SeqCst);
            ENABLED.swap(false, Ordering::SeqCst)
        }

        fn restore(prev: bool) {
            if prev {
                Self::enable();
            }
        }

        fn enable() {
            ENABLED.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn masks_while_held_and_restores_on_drop() {
        let lock: IrqSpinLock<u32, FakeIrq> = IrqSpinLock::new(1);
        {
            let mut guard = lock.lock();
            *guard += 1;
            assert!(!ENABLED.load(Ordering::SeqCst));

            // Nested section: still masked after the inner guard drops.
            let other: IrqSpinLock<u32, FakeIrq> = IrqSpinLock::new(0);
            drop(other.lock());
            assert!(!ENABLED.load(Ordering::SeqCst));

            assert!(lock.try_lock().is_none());
            assert!(!ENABLED.load(Ordering::SeqCst));
        }
        assert!(ENABLED.load(Ordering::SeqCst));
        assert_eq!(*lock.lock(), 2);
        assert!(DISABLE_CALLS.load(Ordering::SeqCst) >= 4);
    }
}
