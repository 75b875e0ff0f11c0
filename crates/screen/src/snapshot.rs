use chrono::NaiveDate;
use kabu_core::market::entity::{FinancialsRow, MasterRow};
use std::collections::BTreeMap;

/// # Summary
/// 带版本日期的参考数据行。
///
/// # Invariants
/// - `key` 为证券代码，`as_of` 为该快照的版本日期。
pub trait Snapshot {
    fn key(&self) -> &str;
    fn as_of(&self) -> NaiveDate;
}

impl Snapshot for MasterRow {
    fn key(&self) -> &str {
        &self.code
    }
    fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}

impl Snapshot for FinancialsRow {
    fn key(&self) -> &str {
        &self.code
    }
    fn as_of(&self) -> NaiveDate {
        self.disclosed
    }
}

/// # Summary
/// 为每个代码选出版本日期最大的快照。
///
/// # Invariants
/// - 输出中每个不同的代码恰好一行，且该行的日期是同代码所有行中的最大值。
/// - 日期相同时后出现者胜出；上游按文件路径升序、文件内按行序提供数据，
///   因此结果是确定的。
/// - 不因数值字段缺失而丢弃行：最新快照即使股数为 `None` 也会被选中。
///
/// # Arguments
/// * `rows`: 任意顺序的快照行。
///
/// # Returns
/// 以代码为键的最新快照表。
pub fn resolve_latest<T: Snapshot>(rows: impl IntoIterator<Item = T>) -> BTreeMap<String, T> {
    let mut latest: BTreeMap<String, T> = BTreeMap::new();
    for row in rows {
        let newer = latest
            .get(row.key())
            .is_none_or(|current| row.as_of() >= current.as_of());
        if newer {
            latest.insert(row.key().to_string(), row);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fins(code: &str, disclosed: NaiveDate, shares: Option<f64>) -> FinancialsRow {
        FinancialsRow {
            code: code.to_string(),
            disclosed,
            shares_outstanding: shares,
        }
    }

    #[test]
    fn test_latest_disclosure_wins_regardless_of_order() {
        let rows = vec![
            fins("2002", date(2024, 6, 1), Some(200.0)),
            fins("1001", date(2024, 3, 1), Some(10.0)),
            fins("2002", date(2024, 1, 1), Some(100.0)),
        ];
        let latest = resolve_latest(rows);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["2002"].disclosed, date(2024, 6, 1));
        assert_eq!(latest["2002"].shares_outstanding, Some(200.0));
        assert_eq!(latest["1001"].shares_outstanding, Some(10.0));
    }

    #[test]
    fn test_tie_resolves_to_last_encountered() {
        let rows = vec![
            fins("2002", date(2024, 6, 1), Some(1.0)),
            fins("2002", date(2024, 6, 1), Some(2.0)),
        ];
        assert_eq!(resolve_latest(rows)["2002"].shares_outstanding, Some(2.0));
    }

    #[test]
    fn test_latest_snapshot_with_absent_shares_is_kept() {
        let rows = vec![
            fins("2002", date(2024, 1, 1), Some(100.0)),
            fins("2002", date(2024, 6, 1), None),
        ];
        assert_eq!(resolve_latest(rows)["2002"].shares_outstanding, None);
    }

    #[test]
    fn test_master_uses_applicable_date() {
        let rows = vec![
            MasterRow { code: "1001".into(), company_name: Some("New".into()), as_of: date(2024, 6, 1) },
            MasterRow { code: "1001".into(), company_name: Some("Old".into()), as_of: date(2023, 6, 1) },
        ];
        assert_eq!(resolve_latest(rows)["1001"].company_name.as_deref(), Some("New"));
    }

    #[test]
    fn test_one_row_per_code_with_maximum_date() {
        let mut rows = Vec::new();
        for code in 0..20u32 {
            for day in [3u32, 17, 9, 28, 1] {
                rows.push(fins(&format!("{code:04}"), date(2024, 1 + code % 12, day), Some(f64::from(day))));
            }
        }
        let latest = resolve_latest(rows.clone());
        assert_eq!(latest.len(), 20);
        for (code, row) in &latest {
            let max = rows.iter().filter(|r| &r.code == code).map(|r| r.disclosed).max().unwrap();
            assert_eq!(row.disclosed, max);
        }
    }
}
