#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use sleuth_annotator::Sectionizer;

fuzz_target!(|data: &[u8]| {
    let lines: Vec<Bytes> = data
        .split_inclusive(|b| *b == b'\n')
        .map(Bytes::copy_from_slice)
        .collect();

    let sections = match Sectionizer::split(lines.clone()) {
        Ok(sections) => sections,
        Err(e) => panic!("non-empty lines must never be rejected: {e}"),
    };

    // 섹션을 이어 붙이면 원본 입력과 같아야 함
    let rebuilt: Vec<u8> = sections
        .into_iter()
        .flat_map(|s| s.into_output())
        .flat_map(|chunk| chunk.to_vec())
        .collect();
    assert_eq!(rebuilt, data);
});
