// rulegate-fuzzy/src/confusables/mod.rs
//! Equivalence classes of characters that are interchangeable for matching.
//!
//! Every character of a class maps to the same bracketed pattern fragment, so
//! a banned word written with `a` also matches `Ａ`, `ⓐ`, `á` or Cyrillic `а`.
//! The standard table is built once on first use and never changes.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use once_cell::sync::Lazy;

/// The standard table: Latin letters, digits and Japanese kana.
pub static DEFAULT_CONFUSABLES: Lazy<ConfusableMap> =
    Lazy::new(|| ConfusableMapBuilder::standard().build());

const DIACRITICS: &[(char, &str)] = &[
    ('a', "àáâãäåāăą"),
    ('c', "çćĉċč"),
    ('d', "ďđ"),
    ('e', "èéêëēĕėęě"),
    ('g', "ĝğġģ"),
    ('h', "ĥħ"),
    ('i', "ìíîïĩīĭįı"),
    ('j', "ĵ"),
    ('k', "ķ"),
    ('l', "ĺļľŀł"),
    ('n', "ñńņň"),
    ('o', "òóôõöøōŏő"),
    ('r', "ŕŗř"),
    ('s', "śŝşš"),
    ('t', "ţťŧ"),
    ('u', "ùúûüũūŭůűų"),
    ('w', "ŵ"),
    ('y', "ýÿŷ"),
    ('z', "źżž"),
];

// Cyrillic and Greek letters that render like Latin ones.
const HOMOGLYPHS: &[(char, &str)] = &[
    ('a', "аα"),
    ('c', "с"),
    ('e', "е"),
    ('h', "һ"),
    ('i', "іι"),
    ('j', "ј"),
    ('k', "κ"),
    ('o', "оο"),
    ('p', "рρ"),
    ('s', "ѕ"),
    ('x', "хχ"),
    ('y', "у"),
];

// Half-width katakana U+FF71..=U+FF9D in code point order.
const HALF_WIDTH_KATAKANA: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワン";

/// Character → pattern fragment lookup.
#[derive(Debug, Clone, Default)]
pub struct ConfusableMap {
    fragments: HashMap<char, String>,
}

impl ConfusableMap {
    pub fn builder() -> ConfusableMapBuilder {
        ConfusableMapBuilder::default()
    }

    /// The bracketed class fragment for `c`, if `c` belongs to a class.
    pub fn fragment(&self, c: char) -> Option<&str> {
        self.fragments.get(&c).map(String::as_str)
    }

    /// Number of characters covered by some class.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Accumulates classes, merging any that share a character.
#[derive(Debug, Clone, Default)]
pub struct ConfusableMapBuilder {
    classes: Vec<BTreeSet<char>>,
    index: HashMap<char, usize>,
}

impl ConfusableMapBuilder {
    /// A builder preloaded with the standard table, ready to be extended.
    pub fn standard() -> Self {
        let mut builder = Self::default();
        add_latin_letters(&mut builder);
        add_digits(&mut builder);
        add_kana(&mut builder);
        builder
    }

    pub fn class<I: IntoIterator<Item = char>>(mut self, chars: I) -> Self {
        self.add_class(chars);
        self
    }

    pub fn add_class<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        let incoming: BTreeSet<char> = chars.into_iter().collect();
        if incoming.len() < 2 {
            return;
        }

        let mut touched: BTreeSet<usize> = incoming
            .iter()
            .filter_map(|c| self.index.get(c).copied())
            .collect();

        let target = match touched.pop_first() {
            Some(idx) => idx,
            None => {
                self.classes.push(BTreeSet::new());
                self.classes.len() - 1
            }
        };

        for other in touched {
            let moved = std::mem::take(&mut self.classes[other]);
            self.classes[target].extend(moved);
        }
        self.classes[target].extend(incoming);

        for c in &self.classes[target] {
            self.index.insert(*c, target);
        }
    }

    pub fn build(self) -> ConfusableMap {
        let mut fragments = HashMap::with_capacity(self.index.len());
        for class in self.classes.iter().filter(|class| !class.is_empty()) {
            let fragment = class_fragment(class);
            for c in class {
                fragments.insert(*c, fragment.clone());
            }
        }
        debug!("Built confusable map covering {} characters.", fragments.len());
        ConfusableMap { fragments }
    }
}

fn class_fragment(class: &BTreeSet<char>) -> String {
    let mut fragment = String::from("[");
    let mut buf = [0u8; 4];
    for c in class {
        fragment.push_str(&regex::escape(c.encode_utf8(&mut buf)));
    }
    fragment.push(']');
    fragment
}

fn with_single_uppercase(chars: &str) -> Vec<char> {
    let mut out = Vec::new();
    for c in chars.chars() {
        out.push(c);
        let mut upper = c.to_uppercase();
        if let (Some(u), None) = (upper.next(), upper.next()) {
            if u != c {
                out.push(u);
            }
        }
    }
    out
}

fn add_latin_letters(builder: &mut ConfusableMapBuilder) {
    for (offset, lower) in (0u32..).zip('a'..='z') {
        let mut class = vec![lower, lower.to_ascii_uppercase()];
        class.extend(
            [
                0xFF41 + offset,  // full-width small
                0xFF21 + offset,  // full-width capital
                0x24D0 + offset,  // circled small
                0x24B6 + offset,  // circled capital
                0x249C + offset,  // parenthesized small
                0x1F130 + offset, // squared capital
                0x1F170 + offset, // negative squared capital
            ]
            .into_iter()
            .filter_map(char::from_u32),
        );

        for (base, variants) in DIACRITICS.iter().chain(HOMOGLYPHS) {
            if *base == lower {
                class.extend(with_single_uppercase(variants));
            }
        }
        builder.add_class(class);
    }
}

fn add_digits(builder: &mut ConfusableMapBuilder) {
    for (digit, ascii) in (0u32..).zip('0'..='9') {
        let mut class = vec![ascii];
        class.extend(char::from_u32(0xFF10 + digit));
        if digit == 0 {
            class.extend(char::from_u32(0x24EA)); // circled zero
        } else {
            class.extend(
                [
                    0x2460 + digit - 1, // circled
                    0x2474 + digit - 1, // parenthesized
                    0x2488 + digit - 1, // with full stop
                    0x2776 + digit - 1, // negative circled
                ]
                .into_iter()
                .filter_map(char::from_u32),
            );
        }
        builder.add_class(class);
    }
}

fn add_kana(builder: &mut ConfusableMapBuilder) {
    for hiragana in 0x3041u32..=0x3096 {
        let class = [hiragana, hiragana + 0x60]
            .into_iter()
            .filter_map(char::from_u32);
        builder.add_class(class);
    }

    for (half, katakana) in (0xFF71u32..).zip(HALF_WIDTH_KATAKANA.chars()) {
        if let Some(half) = char::from_u32(half) {
            builder.add_class([half, katakana]);
        }
    }
    builder.add_class(['ー', 'ｰ', '－']);
}
