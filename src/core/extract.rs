//! 槽位抽取：自由文本 -> PartialContext
//!
//! 规则是一组显式排序的独立函数（同一输入可触发多条），顺序即优先级；
//! 每条规则只写入本回合新发现的槽位，合并交给 TripContext::merge（只填充语义）。
//! 日期统一归一化为 YYYY-MM-DD，无法解析的日期静默丢弃。

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::core::{PartialContext, TravelMode, TripContext};

/// 日期字面量：YYYY-MM-DD 或 D/M/YYYY、D-M-YYYY
const DATE_PAT: &str = r"\d{4}-\d{2}-\d{2}|\d{1,2}[/-]\d{1,2}[/-]\d{4}";

struct Regexes {
    destination: Regex,
    origin: Regex,
    date_range: Regex,
    single_date: Regex,
    travelers: Regex,
    budget: Regex,
    hotel: Regex,
    booking_details: Regex,
}

fn regexes() -> &'static Regexes {
    static RE: OnceLock<Regexes> = OnceLock::new();
    RE.get_or_init(|| Regexes {
        destination: Regex::new(r"(?:travel to|trip to|plan for|going to|in)\s+([a-z\s\-]+)")
            .unwrap(),
        origin: Regex::new(r"from\s+([a-z\s\-]+)\s+to").unwrap(),
        date_range: Regex::new(&format!(r"({DATE_PAT})\s*(?:to|-)\s*({DATE_PAT})")).unwrap(),
        single_date: Regex::new(&format!(r"(?:on|for)\s+({DATE_PAT})")).unwrap(),
        travelers: Regex::new(r"(\d+)\s*(?:person|people|traveler)s?").unwrap(),
        budget: Regex::new(r"budget.*?(\d+)").unwrap(),
        // regex crate 无前瞻，终止符改为吞掉的分支；捕获组语义与原行为一致
        hotel: Regex::new(&format!(
            r"(?:book|reserve)(?: a room in| the)?\s+(.+?)\s*(?:from|for|on|{DATE_PAT}|$)"
        ))
        .unwrap(),
        booking_details: Regex::new(&format!(
            r"(?:from|for)\s+({DATE_PAT})\s*(?:to|-)?\s*({DATE_PAT})?\s*(?:for\s+(\d+)\s*guest(?:s)?)?"
        ))
        .unwrap(),
    })
}

/// 将 YYYY-MM-DD / D-M-YYYY / D/M/YYYY 归一化为 YYYY-MM-DD；已归一化的输入原样返回（幂等）
pub fn normalize_date(raw: &str) -> Option<String> {
    let d = raw.replace('/', "-");
    for fmt in ["%d-%m-%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&d, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

/// 每个词首字母大写（对应目的地/酒店名的展示形式）
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// 目的地短语截断：丢弃从子句边界词开始的尾部（"manali from ..." -> "manali"）
fn trim_clause_tail(phrase: &str) -> String {
    const BOUNDARY: [&str; 7] = ["from", "to", "on", "for", "with", "between", "during"];
    let mut words: Vec<&str> = Vec::new();
    for w in phrase.split_whitespace() {
        if BOUNDARY.contains(&w) {
            break;
        }
        words.push(w);
    }
    words.join(" ")
}

fn wants_booking(s: &str) -> bool {
    s.contains("book") || s.contains("reserve")
}

type Rule = fn(&str, &TripContext, &mut PartialContext);

/// 规则表：按序独立求值
const RULES: &[Rule] = &[
    rule_destination,
    rule_origin,
    rule_date_range,
    rule_single_date,
    rule_travelers,
    rule_budget,
    rule_travel_mode,
    rule_hotel_booking,
    rule_booking_fallbacks,
];

/// 抽取槽位：对 raw_text 施加全部规则，返回本回合新发现的部分上下文
///
/// prior 仅用于条件默认值（目的地已知则不再抽取、预订日期回退等），不会被修改。
pub fn extract(raw_text: &str, prior: &TripContext) -> PartialContext {
    let s = raw_text.to_lowercase();
    let mut out = PartialContext::default();
    for rule in RULES {
        rule(&s, prior, &mut out);
    }
    out
}

/// 目的地：仅在尚未设置时抽取
fn rule_destination(s: &str, prior: &TripContext, out: &mut PartialContext) {
    if prior.destination.is_some() || out.destination.is_some() {
        return;
    }
    if let Some(caps) = regexes().destination.captures(s) {
        let phrase = trim_clause_tail(caps[1].trim());
        if !phrase.is_empty() {
            out.destination = Some(title_case(&phrase));
        }
    }
}

/// 出发地："from X to"
fn rule_origin(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    if let Some(caps) = regexes().origin.captures(s) {
        let origin = caps[1].trim();
        if !origin.is_empty() {
            out.origin = Some(title_case(origin));
        }
    }
}

/// 行程日期区间："D1 to D2" / "D1 - D2"
fn rule_date_range(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    if let Some(caps) = regexes().date_range.captures(s) {
        out.start_date = normalize_date(&caps[1]);
        out.end_date = normalize_date(&caps[2]);
    }
}

/// 单个日期（"on"/"for" 之后）：填充未设置的 start_date；
/// 同回合含 book/reserve 时兼作 check_in_date
fn rule_single_date(s: &str, prior: &TripContext, out: &mut PartialContext) {
    let Some(caps) = regexes().single_date.captures(s) else {
        return;
    };
    let date = normalize_date(&caps[1]);
    if out.start_date.is_none() && prior.start_date.is_none() {
        out.start_date = date.clone();
    }
    if out.check_in_date.is_none() && prior.check_in_date.is_none() && wants_booking(s) {
        out.check_in_date = date;
    }
}

/// 出行人数："N person(s)/people/traveler(s)"
fn rule_travelers(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    if let Some(caps) = regexes().travelers.captures(s) {
        out.travelers = caps[1].parse().ok();
    }
}

/// 预算："budget" 后最近的整数
fn rule_budget(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    if let Some(caps) = regexes().budget.captures(s) {
        out.budget_total = caps[1].parse().ok();
    }
}

/// 交通方式：car 优先，其次 flight/plane，最后 train
fn rule_travel_mode(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    out.travel_mode_preference = if s.contains("car") {
        Some(TravelMode::Car)
    } else if s.contains("flight") || s.contains("plane") {
        Some(TravelMode::Flight)
    } else if s.contains("train") {
        Some(TravelMode::Train)
    } else {
        None
    };
}

/// 预订语句：抽取酒店名，并尝试同句内的 "from D1 to D2 for N guests" 明细
/// （明细覆盖单日期回退；酒店名在首个日期样式或 from/for/on 处截止，含数字的名字会失真）
fn rule_hotel_booking(s: &str, _prior: &TripContext, out: &mut PartialContext) {
    let Some(caps) = regexes().hotel.captures(s) else {
        return;
    };
    let name = caps[1].trim();
    if !name.is_empty() {
        out.hotel_name = Some(title_case(name));
    }

    if let Some(details) = regexes().booking_details.captures(s) {
        out.check_in_date = normalize_date(&details[1]);
        if let Some(d2) = details.get(2) {
            out.check_out_date = normalize_date(d2.as_str());
        }
        if let Some(n) = details.get(3) {
            out.travelers = n.as_str().parse().ok();
        }
    }
}

/// 预订回退：book/reserve 语句缺入住/退房日期时回退到行程 start/end
fn rule_booking_fallbacks(s: &str, prior: &TripContext, out: &mut PartialContext) {
    if !wants_booking(s) {
        return;
    }
    if out.check_in_date.is_none() && prior.check_in_date.is_none() {
        if let Some(d) = out.start_date.clone().or_else(|| prior.start_date.clone()) {
            out.check_in_date = Some(d);
        }
    }
    if out.check_out_date.is_none() && prior.check_out_date.is_none() {
        if let Some(d) = out.end_date.clone().or_else(|| prior.end_date.clone()) {
            out.check_out_date = Some(d);
        }
    }
}
