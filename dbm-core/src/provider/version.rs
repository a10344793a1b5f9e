//! 镜像版本标签的主版本线判定
//!
//! 同一个主版本线有很多等价标签（`2`、`2.7`、`2.7-alpine`、`latest`、`alpine`），
//! 因此分支判断基于主版本号前缀和别名，而不是字符串相等。

/// 标签开头的主版本号，例如 `2.7-alpine` -> 2，`v1.8` -> 1
pub fn major_version(tag: &str) -> Option<u32> {
    let digits: String = tag
        .trim()
        .trim_start_matches(['v', 'V'])
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// 没有数字前缀的标签（`latest`、`alpine`、`bookworm` 等）总是指向最新主版本
pub fn is_alias_tag(tag: &str) -> bool {
    major_version(tag).is_none()
}

/// 主版本线：`[min_major, max_major]` 区间，可选地包含别名标签
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionLine {
    min_major: u32,
    max_major: Option<u32>,
    includes_aliases: bool,
}

impl VersionLine {
    /// 主版本号不低于 `min_major` 的版本线，别名标签也归入其中
    pub const fn newest_from(min_major: u32) -> Self {
        Self {
            min_major,
            max_major: None,
            includes_aliases: true,
        }
    }

    /// 固定主版本号的旧版本线
    pub const fn exactly(major: u32) -> Self {
        Self {
            min_major: major,
            max_major: Some(major),
            includes_aliases: false,
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        if is_alias_tag(tag) {
            return self.includes_aliases;
        }
        major_version(tag)
            .is_some_and(|major| major >= self.min_major && self.max_major.is_none_or(|max| major <= max))
    }
}
