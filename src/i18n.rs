// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持英文（默认）和中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"en" 或 "zh-CN"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use mrp_component_import::i18n::t;
/// let msg = t("import.no_data_rows");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use mrp_component_import::i18n::t_with_args;
/// let msg = t_with_args("import.orders_created", &[("count", "2")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    fill_placeholders(rust_i18n::t!(key).to_string(), args)
}

/// 按指定语言翻译（不修改全局语言）
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    fill_placeholders(rust_i18n::t!(key, locale = locale).to_string(), args)
}

fn fill_placeholders(mut result: String, args: &[(&str, &str)]) -> String {
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // rust-i18n 的 locale 为全局状态，且 Rust 测试默认并行执行；
    // 这里只使用 t_in 显式指定语言，不改动全局 locale。

    #[test]
    fn test_translate_simple() {
        assert_eq!(t_in("en", "common.success", &[]), "Operation successful");
        assert_eq!(t_in("zh-CN", "common.success", &[]), "操作成功");
    }

    #[test]
    fn test_translate_with_args() {
        let msg = t_in("en", "import.line_error", &[("line", "3"), ("error", "boom")]);
        assert_eq!(msg, "Line 3 – boom");

        let msg = t_in("zh-CN", "import.orders_created", &[("count", "2")]);
        assert!(msg.contains('2'));
        assert!(msg.contains("生产订单"));
    }

    #[test]
    fn test_default_locale_is_english() {
        let msg = t_with_args("import.orders_created", &[("count", "5")]);
        assert_eq!(msg, "5 production order(s) created.");
    }
}
