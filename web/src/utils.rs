/// Board seed drawn from `Math.random`, used whenever no `--seed` flag is set.
pub(crate) fn js_random_seed() -> u64 {
    let mut bytes = [0u8; 8];
    for byte in &mut bytes {
        *byte = (256. * js_sys::Math::random()) as u8;
    }
    u64::from_be_bytes(bytes)
}
