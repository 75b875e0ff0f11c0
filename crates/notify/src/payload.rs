/// 截断后追加在正文末尾的标记。
pub const TRUNCATION_MARKER: &str = "\n…(truncated)";

const FENCE: &str = "```";
const CLOSING_FENCE: &str = "\n```";

/// # Summary
/// 将文本压缩到传输上限以内。
///
/// # Invariants
/// - 未超限的文本原样返回。
/// - 超限时结果以 `TRUNCATION_MARKER` 结尾，且总字符数不超过 `max_chars`
///   （要求 `max_chars` 不小于标记与收尾围栏的长度之和）。
/// - 被截断处若处于未闭合的代码块内，先补齐 ``` 再追加标记。
///
/// # Logic
/// 1. 按字符（非字节）计算长度。
/// 2. 预留标记与收尾围栏的空间后截取前缀，并尽量回退到整行边界。
/// 3. 去掉被切断的半个围栏，按需闭合代码块。
///
/// # Arguments
/// * `text`: 完整正文。
/// * `max_chars`: 传输允许的最大字符数。
///
/// # Returns
/// 可直接发送的正文。
pub fn fit_payload(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let reserved = TRUNCATION_MARKER.chars().count() + CLOSING_FENCE.chars().count();
    let budget = max_chars.saturating_sub(reserved);
    let mut kept: String = text.chars().take(budget).collect();

    if let Some(line_end) = kept.rfind('\n') {
        if line_end > 0 {
            kept.truncate(line_end);
        }
    }
    while kept.ends_with('`') {
        kept.pop();
    }
    if kept.matches(FENCE).count() % 2 == 1 {
        kept.push_str(CLOSING_FENCE);
    }
    kept.push_str(TRUNCATION_MARKER);
    kept
}
