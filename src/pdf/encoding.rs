/// Encode text for the standard Type1 fonts with `WinAnsiEncoding`.
///
/// Latin-1 maps one-to-one; the few cp1252 extras a FatturaPA invoice is
/// likely to contain are mapped explicitly, anything else becomes `?`.
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) < 0x80 && !c.is_control() => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            '\t' | '\n' | '\r' => b' ',
            _ => b'?',
        })
        .collect()
}
