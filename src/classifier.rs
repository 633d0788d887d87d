//! Signal classifier
//!
//! Decides whether a channel message looks like something the ingestion API
//! understands. Three message families are recognised:
//!
//! ```text
//! New signal                 Take-profit update                     Stop-loss hit
//! script      : BTCUSD       Take Profit 2 From Long Signal          Hit SL From Short Signal
//! Position    : BUY          at Price : 91995.90 in BTCUSD           Price : 89659.22 in BTCUSD
//! Enter Price : 90827.56
//! Take Profit 1 : 91528.57
//! Stoploss    : 89659.22
//! ```
//!
//! Only a verdict is produced; field extraction happens downstream.

use once_cell::sync::Lazy;
use regex::Regex;

/// Unsigned decimal: digits with an optional fractional part
const NUMBER: &str = r"[0-9]+(?:\.[0-9]+)?";

/// Horizontal whitespace; a label and its value share one line
const GAP: &str = r"[ \t]*";

fn compile(pattern: &str) -> Regex {
    let full = format!(
        "(?i){}",
        pattern.replace("{num}", NUMBER).replace("{gap}", GAP)
    );
    Regex::new(&full).unwrap_or_else(|e| panic!("invalid classifier pattern {pattern:?}: {e}"))
}

static SCRIPT: Lazy<Regex> = Lazy::new(|| compile(r"\bscript{gap}:{gap}\S+"));
static POSITION: Lazy<Regex> = Lazy::new(|| compile(r"\bposition{gap}:{gap}(?:buy|sell)\b"));
static ENTER_PRICE: Lazy<Regex> = Lazy::new(|| compile(r"\benter\s+price{gap}:{gap}{num}"));
static TAKE_PROFIT_1: Lazy<Regex> =
    Lazy::new(|| compile(r"\btake\s+profit\s+1{gap}:{gap}{num}"));
static STOPLOSS: Lazy<Regex> = Lazy::new(|| compile(r"\bstoploss{gap}:{gap}{num}"));

static TAKE_PROFIT_UPDATE: Lazy<Regex> =
    Lazy::new(|| compile(r"\btake\s+profit\s+[0-9]+\s+from\s+(?:long|short)\s+signal\b"));
static STOP_LOSS_HIT: Lazy<Regex> =
    Lazy::new(|| compile(r"\bhit\s+sl\s+from\s+(?:long|short)\s+signal\b"));
static PRICE_IN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?:\bat\s+)?\bprice{gap}:{gap}{num}[ \t]+in[ \t]+\S+"));

/// Which message family matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    NewSignal,
    TakeProfitUpdate,
    StopLossHit,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewSignal => "new_signal",
            Self::TakeProfitUpdate => "take_profit",
            Self::StopLossHit => "stop_loss",
        }
    }
}

fn is_new_signal(text: &str) -> bool {
    [&SCRIPT, &POSITION, &ENTER_PRICE, &TAKE_PROFIT_1, &STOPLOSS]
        .iter()
        .all(|re| re.is_match(text))
}

fn is_take_profit_update(text: &str) -> bool {
    TAKE_PROFIT_UPDATE.is_match(text) && PRICE_IN.is_match(text)
}

fn is_stop_loss_hit(text: &str) -> bool {
    STOP_LOSS_HIT.is_match(text) && PRICE_IN.is_match(text)
}

/// Classify a message, returning the first family it matches
pub fn classify(text: &str) -> Option<SignalKind> {
    if is_new_signal(text) {
        Some(SignalKind::NewSignal)
    } else if is_take_profit_update(text) {
        Some(SignalKind::TakeProfitUpdate)
    } else if is_stop_loss_hit(text) {
        Some(SignalKind::StopLossHit)
    } else {
        None
    }
}

/// True when the text should be forwarded to the ingestion API
pub fn is_signal_message(text: &str) -> bool {
    classify(text).is_some()
}
