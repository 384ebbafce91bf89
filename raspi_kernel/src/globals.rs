use kmem::physical::alloc::freelist::FreeListAllocator;
use spin::Mutex;

/// The system-wide page frame allocator, installed once by
/// `memory::init`. Until a scheduler or interrupts exist there is only
/// ever one execution context touching it; the mutex documents and
/// enforces the single-writer discipline all the same.
pub static PAGE_ALLOCATOR: Mutex<Option<FreeListAllocator>> = Mutex::new(None);
