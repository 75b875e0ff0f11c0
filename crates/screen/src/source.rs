//! Arrow 记录批到强类型行的解码。
//!
//! 列按配置的候选名查找；日期、代码、数值分别做显式转换。
//! 无法转换的数值一律变为 `None`，不会以 0 代替。

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use chrono::NaiveDate;
use kabu_core::config::SourceConfig;
use kabu_core::market::entity::{FinancialsRow, MasterRow, QuoteRow};
use kabu_core::screen::error::ScreenError;

/// # Summary
/// 单个文件的解码结果。
///
/// # Invariants
/// - `skipped` 为因代码/日期缺失或收盘价非法而丢弃的行数。
/// - `uncoerced` 为保留下来但数值字段无法转换（记为 `None`）的行数。
#[derive(Debug)]
pub struct Decoded<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
    pub uncoerced: usize,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
            uncoerced: 0,
        }
    }
}

/// 解码行情文件。收盘价缺失或非正的行被跳过。
pub fn decode_quotes(
    location: &str,
    table: &[RecordBatch],
    source: &SourceConfig,
) -> Result<Decoded<QuoteRow>, ScreenError> {
    let mut decoded = Decoded::default();
    for batch in table {
        let columns = KeyedColumns::read(location, batch, source)?;
        let closes = number_values(location, find_column(location, batch, &source.value_columns)?)?;

        for ((code, date), close) in columns.codes.into_iter().zip(columns.dates).zip(closes) {
            match (code, date, close) {
                (Some(code), Some(date), Some(close)) if close > 0.0 => {
                    decoded.rows.push(QuoteRow { date, code, close });
                }
                _ => decoded.skipped += 1,
            }
        }
    }
    Ok(decoded)
}

/// 解码上市公司主档。公司名允许缺失。
pub fn decode_master(
    location: &str,
    table: &[RecordBatch],
    source: &SourceConfig,
) -> Result<Decoded<MasterRow>, ScreenError> {
    let mut decoded = Decoded::default();
    for batch in table {
        let columns = KeyedColumns::read(location, batch, source)?;
        let names = text_values(location, find_column(location, batch, &source.value_columns)?)?;

        for ((code, date), company_name) in columns.codes.into_iter().zip(columns.dates).zip(names) {
            match (code, date) {
                (Some(code), Some(as_of)) => decoded.rows.push(MasterRow {
                    code,
                    company_name,
                    as_of,
                }),
                _ => decoded.skipped += 1,
            }
        }
    }
    Ok(decoded)
}

/// # Summary
/// 解码财报摘要。
///
/// # Logic
/// 1. 代码或披露日缺失的行被跳过。
/// 2. 发行股数无法转换或为负时保留该行，股数记为 `None` 并计入 `uncoerced`。
pub fn decode_financials(
    location: &str,
    table: &[RecordBatch],
    source: &SourceConfig,
) -> Result<Decoded<FinancialsRow>, ScreenError> {
    let mut decoded = Decoded::default();
    for batch in table {
        let columns = KeyedColumns::read(location, batch, source)?;
        let shares = number_values(location, find_column(location, batch, &source.value_columns)?)?;

        for ((code, date), shares) in columns.codes.into_iter().zip(columns.dates).zip(shares) {
            let (Some(code), Some(disclosed)) = (code, date) else {
                decoded.skipped += 1;
                continue;
            };
            let shares_outstanding = shares.filter(|v| *v >= 0.0);
            if shares_outstanding.is_none() {
                decoded.uncoerced += 1;
            }
            decoded.rows.push(FinancialsRow {
                code,
                disclosed,
                shares_outstanding,
            });
        }
    }
    Ok(decoded)
}

// 每个数据源都有的代码列与日期列
struct KeyedColumns {
    codes: Vec<Option<String>>,
    dates: Vec<Option<NaiveDate>>,
}

impl KeyedColumns {
    fn read(location: &str, batch: &RecordBatch, source: &SourceConfig) -> Result<Self, ScreenError> {
        Ok(Self {
            codes: text_values(location, find_column(location, batch, &source.code_columns)?)?,
            dates: date_values(location, find_column(location, batch, &source.date_columns)?)?,
        })
    }
}

fn find_column<'a>(
    location: &str,
    batch: &'a RecordBatch,
    candidates: &[String],
) -> Result<&'a ArrayRef, ScreenError> {
    candidates
        .iter()
        .find_map(|name| batch.column_by_name(name))
        .ok_or_else(|| ScreenError::Decode {
            location: location.to_string(),
            message: format!("none of the columns {candidates:?} found"),
        })
}

fn decode_error(location: &str, message: impl std::fmt::Display) -> ScreenError {
    ScreenError::Decode {
        location: location.to_string(),
        message: message.to_string(),
    }
}

/// 任意类型转为去除首尾空白的文本，空串视为缺失。
fn text_values(location: &str, column: &ArrayRef) -> Result<Vec<Option<String>>, ScreenError> {
    let casted = cast(column, &DataType::Utf8).map_err(|e| decode_error(location, e))?;
    let strings = casted
        .as_string_opt::<i32>()
        .ok_or_else(|| decode_error(location, "text cast produced a non-string array"))?;

    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                return None;
            }
            let value = strings.value(i).trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect())
}

/// 日期列：文本与整数按 `YYYY-MM-DD` / `YYYYMMDD` / `YYYY/MM/DD` 解析，时间类型经 Arrow 转换。
fn date_values(location: &str, column: &ArrayRef) -> Result<Vec<Option<NaiveDate>>, ScreenError> {
    let textual = matches!(
        column.data_type(),
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Utf8View
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt32
            | DataType::UInt64
    );
    if textual {
        return Ok(text_values(location, column)?
            .into_iter()
            .map(|value| value.as_deref().and_then(parse_date))
            .collect());
    }

    let casted = cast(column, &DataType::Date32).map_err(|e| decode_error(location, e))?;
    let dates = casted
        .as_primitive_opt::<Date32Type>()
        .ok_or_else(|| decode_error(location, "date cast produced a non-date array"))?;
    Ok((0..dates.len())
        .map(|i| if dates.is_null(i) { None } else { dates.value_as_date(i) })
        .collect())
}

/// 数值列：数值类型直接转为 f64，文本按 `parse_number` 显式转换。
fn number_values(location: &str, column: &ArrayRef) -> Result<Vec<Option<f64>>, ScreenError> {
    let data_type = column.data_type();
    if matches!(data_type, DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View) {
        return Ok(text_values(location, column)?
            .into_iter()
            .map(|value| value.as_deref().and_then(parse_number))
            .collect());
    }
    if !data_type.is_numeric() {
        return Err(decode_error(location, format!("unsupported numeric column type {data_type}")));
    }

    let casted = cast(column, &DataType::Float64).map_err(|e| decode_error(location, e))?;
    let numbers = casted
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| decode_error(location, "numeric cast produced a non-float array"))?;
    Ok((0..numbers.len())
        .map(|i| Some(numbers.value(i)).filter(|v| !numbers.is_null(i) && v.is_finite()))
        .collect())
}

/// 解析日期文本，支持三种常见写法。
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// # Summary
/// 将文本显式转换为数值。
///
/// # Logic
/// 1. 去除空白与千分位分隔符。
/// 2. 空串、`-` 以及无法解析或非有限的值均返回 `None`。
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
