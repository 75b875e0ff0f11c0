use arrow_array::RecordBatch;
use chrono::NaiveDate;

/// # Summary
/// 数据湖中的单个对象（通常为一个 parquet 文件）。
///
/// # Invariants
/// - `location` 为相对 bucket 根目录的路径。
/// - `date` 由文件路径推断，无法推断时为 `None`。
/// - 带日期的行情文件按日落盘：文件内不含早于 `date` 的行，
///   因此日期早于回溯窗口起点的文件可以整体跳过。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LakeObject {
    pub location: String,
    // 文件内最早一行的日期（按日文件即其交易日）
    pub date: Option<NaiveDate>,
}

impl LakeObject {
    /// 由路径构造对象，并从路径中推断日期。
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        let date = date_from_location(&location);
        Self { location, date }
    }
}

/// 已加载到内存中的表，即一个对象解码后的全部记录批。
pub type LakeTable = Vec<RecordBatch>;

/// # Summary
/// 从对象路径推断其所属日期。
///
/// # Logic
/// 1. 优先在文件名中查找 `YYYYMMDD` 或 `YYYY-MM-DD` 形式的日期，取最后一个。
/// 2. 其次尝试 `.../YYYY/MM/DD/...` 形式的分区目录。
///
/// # Arguments
/// * `location`: 对象路径。
///
/// # Returns
/// 推断成功返回日期，否则返回 None。
pub fn date_from_location(location: &str) -> Option<NaiveDate> {
    let file_name = location.rsplit('/').next().unwrap_or(location);
    if let Some(date) = last_embedded_date(file_name) {
        return Some(date);
    }

    let segments: Vec<&str> = location.split('/').collect();
    segments.windows(3).rev().find_map(|w| {
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        if w[0].len() == 4 && all_digits(w[0]) && all_digits(w[1]) && all_digits(w[2]) {
            let year = w[0].parse().ok()?;
            let month = w[1].parse().ok()?;
            let day = w[2].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        } else {
            None
        }
    })
}

fn last_embedded_date(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        // 取出连续的数字/连字符片段
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'-') {
            i += 1;
        }
        let token = name[start..i].trim_end_matches('-');
        let parsed = match token.len() {
            8 => NaiveDate::parse_from_str(token, "%Y%m%d").ok(),
            10 => NaiveDate::parse_from_str(token, "%Y-%m-%d").ok(),
            _ => None,
        };
        if parsed.is_some() {
            found = parsed;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_date_from_file_name() {
        assert_eq!(date_from_location("daily_quotes/quotes_20240603.parquet"), date(2024, 6, 3));
        assert_eq!(date_from_location("fins/2024-06-01.parquet"), date(2024, 6, 1));
        assert_eq!(date_from_location("daily_quotes/v2/20240603.parquet"), date(2024, 6, 3));
    }

    #[test]
    fn test_date_from_partition_segments() {
        assert_eq!(date_from_location("daily_quotes/2024/06/03/part-0.parquet"), date(2024, 6, 3));
    }

    #[test]
    fn test_undated_location() {
        assert_eq!(date_from_location("equities_master/latest.parquet"), None);
        assert_eq!(date_from_location("daily_quotes/part-00001.parquet"), None);
        assert_eq!(LakeObject::new("a/b.parquet").date, None);
    }
}
