#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Must not panic; malformed input is an error, anything else maps.
        if let Ok(invoice) = fattura::fatturapa::map_invoice(s) {
            let document = fattura::export::project(&invoice);
            let _ = document.to_string();
        }
    }
});
