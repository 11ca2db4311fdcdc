#![no_main]

use fattura::core::FieldPath;
use fattura::session::EditSession;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|edits: Vec<(u8, String)>| {
    let original = fattura::fatturapa::map_invoice("<FatturaElettronica/>").unwrap();
    let mut session = EditSession::load(original.clone());
    for (index, value) in edits {
        let path = FieldPath::ALL[index as usize % FieldPath::ALL.len()];
        let before = session.current_invoice().clone();
        if session.set(path, value).is_err() {
            assert_eq!(session.current_invoice(), &before);
        }
    }
    session.reset_to_original();
    assert_eq!(session.current_invoice(), &original);
    assert!(!session.has_changes());
});
