#![no_main]

use bitstream::{copy_bits, BitReader, BitWriter};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let count = usize::from(data[0]) % 72;
    let shift = isize::from(data[1] as i8);
    let split = usize::from(data[2]) % (data.len() - 3) + 3;
    let (src, rest) = data[3..].split_at(split - 3);
    let mut dst = rest.to_vec();
    let before = dst.clone();

    if copy_bits(&mut dst, src, count, shift).is_err() {
        assert_eq!(dst, before, "failed copy must not write");
        return;
    }

    // Bits outside the inserted span are untouched.
    let start = usize::try_from(shift.max(0)).unwrap_or(0);
    for bit in 0..before.len() * 8 {
        if bit >= start && bit < start + count {
            continue;
        }
        let mut old = BitReader::at(&before, bit).unwrap();
        let mut new = BitReader::at(&dst, bit).unwrap();
        assert_eq!(
            old.read_bit().unwrap(),
            new.read_bit().unwrap(),
            "bit {bit}"
        );
    }

    // The writer agrees with copy_bits for short spans.
    if count <= 32 && shift >= 0 {
        let src_value = BitReader::new(src).read_bits(count);
        if let Ok(value) = src_value {
            let mut expected = before.clone();
            if BitWriter::at(&mut expected, start)
                .and_then(|mut writer| writer.write_bits(value, count))
                .is_ok()
            {
                assert_eq!(expected, dst);
            }
        }
    }
});
