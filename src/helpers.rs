//! Display helpers

/// Shorten an address or hash to `0x123...cdef0` for display
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..5], &address[address.len() - 5..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortens_addresses() {
        assert_eq!(
            short_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            "0xf39...92266"
        );
    }

    #[test]
    fn leaves_short_input_alone() {
        assert_eq!(short_address("0x1234"), "0x1234");
        assert_eq!(short_address(""), "");
    }
}
