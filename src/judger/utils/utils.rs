use scraper::{Html, Selector};
use std::str::FromStr;

pub fn get_text_of_html_str(html: &str) -> String {
    Html::parse_fragment(html)
        .root_element()
        .text()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

//提取字符串中唯一的正整数
pub fn extract_integer<F: FromStr + Default>(s: &str) -> F {
    let l = s.find(|x: char| x.is_ascii_digit()).unwrap_or(s.len());
    if l == s.len() {
        return F::default();
    }
    let r = s.rfind(|x: char| x.is_ascii_digit()).unwrap_or(0) + 1;
    s[l..r].parse().unwrap_or_default()
}

/// 表单提交后返回的页面中查找记录 id
pub fn extract_submission_id_from_html(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    if let Ok(selector) = Selector::parse("[data-submission-id], [data-id]") {
        let found = document.select(&selector).find_map(|ele| {
            ele.value()
                .attr("data-submission-id")
                .or_else(|| ele.value().attr("data-id"))
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from)
        });
        if found.is_some() {
            return found;
        }
    }

    let id: u64 = extract_integer(&get_text_of_html_str(html));
    (id > 0).then(|| id.to_string())
}
