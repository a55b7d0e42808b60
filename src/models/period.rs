//! 报告周期（季度 / 半年 / 年末）及标题中的日期识别

use std::sync::OnceLock;

use phf::phf_map;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ConfigError};

/// 报告周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Q1,
    Q2,
    Q3,
    Q4,
    H1,
    H2,
    /// 年末 / 全年报告
    YearEnd,
}

/// 小写 token → 周期
static PERIOD_TOKENS: phf::Map<&'static str, Period> = phf_map! {
    "q1" => Period::Q1,
    "q2" => Period::Q2,
    "q3" => Period::Q3,
    "q4" => Period::Q4,
    "h1" => Period::H1,
    "h2" => Period::H2,
    "year-end" => Period::YearEnd,
    "yearend" => Period::YearEnd,
    "ye" => Period::YearEnd,
    "full-year" => Period::YearEnd,
    "fullyear" => Period::YearEnd,
};

impl Period {
    /// 从 token 解析（不区分大小写）
    pub fn from_token(token: &str) -> Option<Self> {
        PERIOD_TOKENS.get(token.trim().to_lowercase().as_str()).copied()
    }

    /// 标准名称，用于文件夹和文件名
    pub fn name(self) -> &'static str {
        match self {
            Period::Q1 => "Q1",
            Period::Q2 => "Q2",
            Period::Q3 => "Q3",
            Period::Q4 => "Q4",
            Period::H1 => "H1",
            Period::H2 => "H2",
            Period::YearEnd => "YE",
        }
    }

    /// 年内序号：Q1=1, Q2=H1=2, Q3=3, Q4=H2=年末=4
    pub fn ordinal(self) -> i64 {
        match self {
            Period::Q1 => 1,
            Period::Q2 | Period::H1 => 2,
            Period::Q3 => 3,
            Period::Q4 | Period::H2 | Period::YearEnd => 4,
        }
    }

    /// 目标周期是否被找到的周期满足
    ///
    /// 相同周期直接满足；目标为 Q1/Q2 时 H1 也满足，Q3/Q4 时 H2 也满足。
    pub fn is_satisfied_by(self, found: Period) -> bool {
        if self == found {
            return true;
        }
        matches!(
            (self, found),
            (Period::Q1 | Period::Q2, Period::H1) | (Period::Q3 | Period::Q4, Period::H2)
        )
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::from_token(s).ok_or_else(|| {
            AppError::Config(ConfigError::UnknownPeriod {
                token: s.to_string(),
            })
        })
    }
}

/// 可比较的时间值：`year * 4 + ordinal`
pub fn period_value(year: i32, period: Period) -> i64 {
    i64::from(year) * 4 + period.ordinal()
}

fn strict_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(q[1-4]|h[1-2])\s*(\d{4})").expect("valid strict period regex"))
}

fn loose_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(q[1-4]|h[1-2]|year-end|ye|full-year)\s*(\d{4})")
            .expect("valid loose period regex")
    })
}

fn capture(re: &Regex, text: &str) -> Option<(Period, i32)> {
    let lower = text.to_lowercase();
    let caps = re.captures(&lower)?;
    let period = Period::from_token(caps.get(1)?.as_str())?;
    let year = caps.get(2)?.as_str().parse().ok()?;
    Some((period, year))
}

/// 严格匹配 "<Q1-Q4|H1|H2> <年份>"，用于保留判断
pub fn parse_title_date(text: &str) -> Option<(Period, i32)> {
    capture(strict_pattern(), text)
}

/// 宽松匹配，额外接受 year-end / ye / full-year，用于提前停止判断
pub fn parse_title_date_loose(text: &str) -> Option<(Period, i32)> {
    capture(loose_pattern(), text)
}
