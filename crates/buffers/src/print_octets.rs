//! Hex formatting for octet strings.

use std::fmt::Write;

/// Formats a byte slice as space separated hex, showing at most `max` bytes.
///
/// # Example
///
/// ```
/// use wirepack_buffers::print_octets;
///
/// assert_eq!(print_octets(&[0x01, 0x02, 0x0a, 0xff], 16), "01 02 0a ff");
/// assert_eq!(print_octets(&[], 16), "");
/// ```
pub fn print_octets(octets: &[u8], max: usize) -> String {
    if octets.is_empty() {
        return String::new();
    }

    let mut result = format!("{:02x}", octets[0]);
    for &byte in octets.iter().take(max).skip(1) {
        let _ = write!(result, " {:02x}", byte);
    }

    if octets.len() > max {
        let _ = write!(result, "... ({} more)", octets.len() - max);
    }

    result
}

/// Formats a byte slice as contiguous lowercase hex.
///
/// # Example
///
/// ```
/// use wirepack_buffers::hex_octets;
///
/// assert_eq!(hex_octets(&[0xde, 0xad, 0x01]), "dead01");
/// ```
pub fn hex_octets(octets: &[u8]) -> String {
    let mut result = String::with_capacity(octets.len() * 2);
    for &byte in octets {
        let _ = write!(result, "{:02x}", byte);
    }
    result
}
