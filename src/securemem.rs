use std::ops::Deref;

/// Best-effort memory locking for secrets.
///
/// Reduces exposure to swapping on supported OSes, but is not a complete
/// mitigation: small buffers share pages with other allocations, and locking
/// may fail due to OS limits. Failure is non-fatal.
///
/// The guard owns its value behind a `Box` so the locked region stays at a
/// stable address even when the guard itself moves.
pub struct MemoryLock<T: AsRef<[u8]>> {
    inner: Box<T>,
    locked: bool,
}

impl<T: AsRef<[u8]>> MemoryLock<T> {
    pub fn new(inner: T) -> Self {
        let inner = Box::new(inner);
        let bytes = (*inner).as_ref();
        let locked = !bytes.is_empty() && unsafe { lock_region(bytes.as_ptr(), bytes.len()) };
        Self { inner, locked }
    }
}

impl<T: AsRef<[u8]>> Deref for MemoryLock<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: AsRef<[u8]>> Drop for MemoryLock<T> {
    fn drop(&mut self) {
        if self.locked {
            let bytes = (*self.inner).as_ref();
            unsafe { unlock_region(bytes.as_ptr(), bytes.len()) };
        }
    }
}

unsafe fn lock_region(ptr: *const u8, len: usize) -> bool {
    #[cfg(unix)]
    {
        libc::mlock(ptr as *const core::ffi::c_void, len) == 0
    }
    #[cfg(windows)]
    {
        use windows_sys::Win32::System::Memory::VirtualLock;
        VirtualLock(ptr as *const core::ffi::c_void, len) != 0
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (ptr, len);
        false
    }
}

unsafe fn unlock_region(ptr: *const u8, len: usize) {
    #[cfg(unix)]
    {
        let _ = libc::munlock(ptr as *const core::ffi::c_void, len);
    }
    #[cfg(windows)]
    {
        use windows_sys::Win32::System::Memory::VirtualUnlock;
        let _ = VirtualUnlock(ptr as *const core::ffi::c_void, len);
    }
    #[cfg(not(any(unix, windows)))]
    {
        let _ = (ptr, len);
    }
}
