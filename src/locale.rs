//! Log message localization.
//!
//! Every message the scanner emits is keyed by a short numeric code, so log
//! consumers can match on `code` regardless of the language the text is in.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    RuRu,
    EnUs,
}

impl Locale {
    pub fn tag(self) -> &'static str {
        match self {
            Locale::RuRu => "ru_RU",
            Locale::EnUs => "en_US",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale: {0:?}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    /// Accepts `ru`, `en-US`, `en_US.UTF-8` and similar POSIX/BCP 47 shapes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .trim()
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match language.as_str() {
            "ru" => Ok(Locale::RuRu),
            "en" | "c" | "posix" => Ok(Locale::EnUs),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCode {
    ScopeAdded,
    ScopesCleared,
    ScanningDirectory,
    Unreadable,
    CheckingFile,
    Rejected,
    Matched,
    ScanStarted,
}

impl LogCode {
    pub fn code(self) -> &'static str {
        match self {
            LogCode::ScopeAdded => "00001",
            LogCode::ScopesCleared => "00002",
            LogCode::ScanningDirectory => "00003",
            LogCode::Unreadable => "00004",
            LogCode::CheckingFile => "00005",
            LogCode::Rejected => "00006",
            LogCode::Matched => "00007",
            LogCode::ScanStarted => "00008",
        }
    }

    pub fn render(self, locale: Locale, subject: &str) -> String {
        match (locale, self) {
            (Locale::RuRu, LogCode::ScopeAdded) => {
                format!("Добавлен пакет для сканирования: {subject}")
            }
            (Locale::RuRu, LogCode::ScopesCleared) => "Список пакетов для сканирования очищен".into(),
            (Locale::RuRu, LogCode::ScanningDirectory) => {
                format!("Сканирование директории: {subject}")
            }
            (Locale::RuRu, LogCode::Unreadable) => format!("Нет доступа на чтение: {subject}"),
            (Locale::RuRu, LogCode::CheckingFile) => format!("Проверка файла: {subject}"),
            (Locale::RuRu, LogCode::Rejected) => format!("Файл пропущен: {subject}"),
            (Locale::RuRu, LogCode::Matched) => format!("Найден аннотированный класс: {subject}"),
            (Locale::RuRu, LogCode::ScanStarted) => {
                format!("Поиск аннотированных классов в корневой директории: {subject}")
            }
            (Locale::EnUs, LogCode::ScopeAdded) => format!("Package added for scanning: {subject}"),
            (Locale::EnUs, LogCode::ScopesCleared) => "Scan packages cleared".into(),
            (Locale::EnUs, LogCode::ScanningDirectory) => format!("Scanning directory: {subject}"),
            (Locale::EnUs, LogCode::Unreadable) => format!("Entry is not readable: {subject}"),
            (Locale::EnUs, LogCode::CheckingFile) => format!("Checking file: {subject}"),
            (Locale::EnUs, LogCode::Rejected) => format!("File skipped: {subject}"),
            (Locale::EnUs, LogCode::Matched) => format!("Annotated class found: {subject}"),
            (Locale::EnUs, LogCode::ScanStarted) => {
                format!("Searching annotated classes under root directory: {subject}")
            }
        }
    }
}
