fn main() {
    use std::io::{Write, Read};
    use xz2::write::XzEncoder;
    use xz2::read::XzDecoder;
    let raw = b"hello world hello world hello world".repeat(10);
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&raw).unwrap();
    let compressed = encoder.finish().unwrap();
    println!("compressed len {}", compressed.len());
    let mut decoder = XzDecoder::new(&compressed[..]);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    assert_eq!(out, raw);
    println!("OK");
}
