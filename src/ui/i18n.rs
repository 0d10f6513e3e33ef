//! Static text tables and locale detection

use std::env;

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    #[default]
    En,
    Ru,
    He,
}

impl Lang {
    /// Parse a tag like `ru`, `he_IL.UTF-8` or `en-US`
    pub fn from_tag(tag: &str) -> Option<Lang> {
        let primary = tag
            .split(['_', '-', '.', '@'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Lang::En),
            "ru" => Some(Lang::Ru),
            "he" | "iw" => Some(Lang::He),
            _ => None,
        }
    }

    /// First supported tag among `candidates`, else English
    pub fn resolve<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Lang {
        candidates
            .into_iter()
            .filter(|tag| !tag.is_empty() && *tag != "C" && *tag != "POSIX")
            .find_map(Lang::from_tag)
            .unwrap_or_default()
    }

    /// `preferred` (from config) wins, then LC_ALL, LC_MESSAGES, LANG
    pub fn detect(preferred: Option<&str>) -> Lang {
        let vars: Vec<String> = ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .collect();
        Lang::resolve(preferred.into_iter().chain(vars.iter().map(String::as_str)))
    }

    pub fn is_rtl(self) -> bool {
        matches!(self, Lang::He)
    }

    /// Translate `key`, falling back to English and then to the key itself
    pub fn t<'a>(self, key: &'a str) -> &'a str {
        lookup(self, key).or_else(|| lookup(Lang::En, key)).unwrap_or(key)
    }
}

fn lookup(lang: Lang, key: &str) -> Option<&'static str> {
    match lang {
        Lang::En => en(key),
        Lang::Ru => ru(key),
        Lang::He => he(key),
    }
}

fn en(key: &str) -> Option<&'static str> {
    Some(match key {
        "videoNotAvailable" => "Video not available",
        "contentDisabled" => "This content is currently disabled or has not been configured.",
        "adminPanelLink" => "Admin panel",
        "playLabel" => "Play",
        "pauseLabel" => "Pause",
        "watchAgain" => "Watch again",
        "playerHint" => "Enter: play/pause   t: tap screen   a: admin   q: quit",
        "openAdmin" => "Open the admin panel?",
        "openPlayer" => "Open player",
        "playing" => "Playing",
        "paused" => "Paused",
        "ready" => "Ready",
        "ended" => "Finished",
        "adminTitle" => "Admin Panel",
        "adminSubtitle" => "Manage your video and view statistics",
        "videoUrlLabel" => "Video URL",
        "videoUrlPlaceholder" => "https://example.com/video.mp4",
        "saveButton" => "Save URL",
        "urlSaved" => "Video URL saved!",
        "videoStreaming" => "Video streaming",
        "enabled" => "Enabled",
        "disabled" => "Disabled",
        "totalViews" => "Total views",
        "resetButton" => "Reset statistics",
        "confirmStatReset" => "Are you sure you want to reset the view statistics?",
        "qrCodeLink" => "Link for QR code",
        "copyButton" => "Copy link",
        "copied" => "Copied!",
        "quit" => "Quit",
        "selectAction" => "Select action",
        "saveFailed" => "Could not store the change; it may not survive a restart",
        _ => return None,
    })
}

fn ru(key: &str) -> Option<&'static str> {
    Some(match key {
        "videoNotAvailable" => "Видео недоступно",
        "contentDisabled" => "Этот контент сейчас отключён или не настроен.",
        "adminPanelLink" => "Панель администратора",
        "playLabel" => "Воспроизвести",
        "pauseLabel" => "Пауза",
        "watchAgain" => "Смотреть снова",
        "playerHint" => "Enter: пуск/пауза   t: касание экрана   a: админ   q: выход",
        "openAdmin" => "Открыть панель администратора?",
        "openPlayer" => "Открыть плеер",
        "playing" => "Воспроизведение",
        "paused" => "Пауза",
        "ready" => "Готово",
        "ended" => "Завершено",
        "adminTitle" => "Панель администратора",
        "adminSubtitle" => "Управление видео и статистикой просмотров",
        "videoUrlLabel" => "URL видео",
        "saveButton" => "Сохранить URL",
        "urlSaved" => "URL видео сохранён!",
        "videoStreaming" => "Трансляция видео",
        "enabled" => "Включено",
        "disabled" => "Отключено",
        "totalViews" => "Всего просмотров",
        "resetButton" => "Сбросить статистику",
        "confirmStatReset" => "Вы уверены, что хотите сбросить статистику просмотров?",
        "qrCodeLink" => "Ссылка для QR-кода",
        "copyButton" => "Копировать ссылку",
        "copied" => "Скопировано!",
        "quit" => "Выход",
        "selectAction" => "Выберите действие",
        "saveFailed" => "Не удалось сохранить изменение; после перезапуска оно может пропасть",
        _ => return None,
    })
}

fn he(key: &str) -> Option<&'static str> {
    Some(match key {
        "videoNotAvailable" => "הסרטון אינו זמין",
        "contentDisabled" => "התוכן מושבת כרגע או שלא הוגדר.",
        "adminPanelLink" => "לוח ניהול",
        "openAdmin" => "לפתוח את לוח הניהול?",
        "openPlayer" => "פתח נגן",
        "playLabel" => "הפעל",
        "pauseLabel" => "השהה",
        "watchAgain" => "צפה שוב",
        "playing" => "מתנגן",
        "paused" => "מושהה",
        "ready" => "מוכן",
        "ended" => "הסתיים",
        "adminTitle" => "לוח ניהול",
        "adminSubtitle" => "ניהול הסרטון וסטטיסטיקת הצפיות",
        "videoUrlLabel" => "כתובת הסרטון",
        "saveButton" => "שמור כתובת",
        "urlSaved" => "כתובת הסרטון נשמרה!",
        "videoStreaming" => "הזרמת וידאו",
        "enabled" => "פעיל",
        "disabled" => "מושבת",
        "totalViews" => "סך הצפיות",
        "resetButton" => "אפס סטטיסטיקה",
        "confirmStatReset" => "האם אתה בטוח שברצונך לאפס את סטטיסטיקת הצפיות?",
        "qrCodeLink" => "קישור לקוד QR",
        "copyButton" => "העתק קישור",
        "copied" => "הועתק!",
        "quit" => "יציאה",
        "selectAction" => "בחר פעולה",
        _ => return None,
    })
}
