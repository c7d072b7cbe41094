#![no_main]

use libfuzzer_sys::fuzz_target;

use chunkpool_core::{ChunkHandle, Pool, SizeClass, SizeClassTable};

fuzz_target!(|data: &[u8]| {
    let table = SizeClassTable::new(vec![
        SizeClass::new(4, 64),
        SizeClass::new(4, 256),
        SizeClass::new(2, 1024),
    ])
    .unwrap();
    let mut pool = Pool::new(table).unwrap();
    let mut live: Vec<ChunkHandle> = Vec::new();
    let mut dead: Vec<ChunkHandle> = Vec::new();

    // Each 3-byte record is one operation: opcode, then a little-endian u16.
    for op in data.chunks_exact(3) {
        let arg = usize::from(u16::from_le_bytes([op[1], op[2]]));
        match op[0] % 3 {
            0 => {
                if let Ok(handle) = pool.acquire(arg % 1100) {
                    live.push(handle);
                }
            }
            1 if !live.is_empty() => {
                let handle = live.swap_remove(arg % live.len());
                assert!(pool.release(handle).is_ok());
                dead.push(handle);
            }
            2 if !dead.is_empty() => {
                // Stale handles must always be rejected.
                assert!(pool.release(dead[arg % dead.len()]).is_err());
            }
            _ => {}
        }
        assert!(pool.is_consistent());
        assert_eq!(pool.stats().outstanding(), live.len() as u64);
    }
});
