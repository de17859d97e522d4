/// Fold blocks shorter than `min_chars` into their neighbour.
///
/// Greedy: a block is appended to the running buffer (newline-joined) while
/// either the buffer or the block is below `min_chars`; otherwise the buffer
/// is flushed and the block starts a new one. Empty buffers are never
/// emitted, and output preserves input order.
pub fn merge_small(blocks: Vec<String>, min_chars: usize) -> Vec<String> {
    let mut merged = Vec::with_capacity(blocks.len());
    let mut buf = String::new();

    for block in blocks {
        if buf.is_empty() {
            buf = block;
            continue;
        }
        if buf.chars().count() < min_chars || block.chars().count() < min_chars {
            buf.push('\n');
            buf.push_str(&block);
            buf = buf.trim().to_string();
        } else {
            flush(&mut buf, &mut merged);
            buf = block;
        }
    }
    flush(&mut buf, &mut merged);
    merged
}

fn flush(buf: &mut String, merged: &mut Vec<String>) {
    let done = std::mem::take(buf);
    let done = done.trim();
    if !done.is_empty() {
        merged.push(done.to_string());
    }
}
