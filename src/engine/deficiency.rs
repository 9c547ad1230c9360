// ==========================================
// 班产损失追踪系统 - 欠产判定
// ==========================================
// 职责: 判定记录是否欠产 (actual < planned)
// 红线: 纯函数, 不抛错; 非数字输入先归零再比较
// ==========================================

/// 判定是否欠产
///
/// # 返回
/// - `true`: actual < planned, 需要填写损失原因
/// - `false`: actual >= planned
pub fn is_deficient(planned: u32, actual: u32) -> bool {
    actual < planned
}

/// 按 parseInt 规则解析前导整数
///
/// 跳过前导空白, 允许一个 +/- 号, 读取连续数字; 之后的字符忽略。
/// 没有任何数字时返回 None。
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // 超长数字按饱和处理
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// 将原始输入归一为非负计数
///
/// 空值、无法解析、负数一律视为 0
pub fn coerce_count(raw: &str) -> u32 {
    match parse_leading_int(raw) {
        Some(v) if v > 0 => u32::try_from(v).unwrap_or(u32::MAX),
        _ => 0,
    }
}

/// 按原始输入判定是否欠产
pub fn is_deficient_raw(planned: &str, actual: &str) -> bool {
    is_deficient(coerce_count(planned), coerce_count(actual))
}
