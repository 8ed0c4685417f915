// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for non-technical users.
//
// Every technical error is mapped to plain Russian with a clear suggestion.
// The severity drives how the UI presents it.

use crate::error::EasyPrinterError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Busy device, slow tool: trying again usually works.
    Transient,
    /// User must do something (switch the printer on, pick another file).
    ActionRequired,
    /// Retrying won't help.
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: impl Into<String>, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            retriable,
            severity,
        }
    }
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}

/// Convert an [`EasyPrinterError`] into a [`HumanError`].
pub fn humanize_error(err: &EasyPrinterError) -> HumanError {
    match err {
        EasyPrinterError::DeviceNotFound => HumanError::new(
            "Принтер не найден.",
            "Проверьте, что принтер включён и подключён к компьютеру или сети.",
            true,
            Severity::ActionRequired,
        ),

        EasyPrinterError::BackendUnavailable(tool) => HumanError::new(
            "Не удалось запустить системную программу печати.",
            format!("Убедитесь, что служба печати установлена и запущена. ({tool})"),
            false,
            Severity::Permanent,
        ),

        EasyPrinterError::Timeout { .. } => HumanError::new(
            "Принтер не ответил вовремя.",
            "Возможно, он занят или выключен. Подождите немного и попробуйте снова.",
            true,
            Severity::Transient,
        ),

        EasyPrinterError::CommandFailed { stderr, .. } => humanize_command_failure(stderr),

        EasyPrinterError::ManualScanRequired(_) => HumanError::new(
            "Автоматическое сканирование недоступно.",
            "Отсканируйте документ вручную в открывшейся программе сканирования.",
            false,
            Severity::ActionRequired,
        ),

        EasyPrinterError::UnsupportedFormat(ext) => HumanError::new(
            "Этот тип файла не поддерживается.",
            format!("Сохраните файл как PDF или изображение и попробуйте снова. (Тип файла: {ext})"),
            false,
            Severity::Permanent,
        ),

        EasyPrinterError::ImageError(_) => HumanError::new(
            "Не удалось обработать изображение.",
            "Возможно, файл повреждён. Попробуйте сохранить его как JPEG или PNG.",
            false,
            Severity::Permanent,
        ),

        EasyPrinterError::TransientIo(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError::new(
                "Файл не найден.",
                "Возможно, он был перемещён или удалён. Выберите файл заново.",
                false,
                Severity::ActionRequired,
            ),
            std::io::ErrorKind::PermissionDenied => HumanError::new(
                "Нет доступа к файлу или папке.",
                "Выберите другую папку или проверьте права доступа.",
                false,
                Severity::ActionRequired,
            ),
            _ => HumanError::new(
                "Ошибка чтения или записи файла.",
                "Попробуйте ещё раз. Если ошибка повторяется, проверьте свободное место на диске.",
                true,
                Severity::Transient,
            ),
        },

        EasyPrinterError::Serialization(_) => HumanError::new(
            "Файл настроек повреждён.",
            "Настройки будут сброшены на значения по умолчанию.",
            false,
            Severity::Permanent,
        ),
    }
}

/// Spooler stderr is free text; pick out the conditions a user can fix.
fn humanize_command_failure(stderr: &str) -> HumanError {
    let lower = stderr.to_lowercase();

    if lower.contains("not accepting") || lower.contains("disabled") {
        HumanError::new(
            "Принтер не принимает задания.",
            "Включите принтер и проверьте, что он не приостановлен в настройках системы.",
            true,
            Severity::ActionRequired,
        )
    } else if lower.contains("unknown printer")
        || lower.contains("does not exist")
        || lower.contains("no such")
    {
        HumanError::new(
            "Принтер не найден в системе.",
            "Переподключите принтер и попробуйте снова.",
            true,
            Severity::ActionRequired,
        )
    } else if lower.contains("jam") {
        HumanError::new(
            "В принтере застряла бумага.",
            "Аккуратно извлеките бумагу и закройте все крышки.",
            false,
            Severity::ActionRequired,
        )
    } else {
        HumanError::new(
            "Принтер сообщил об ошибке.",
            format!("Попробуйте ещё раз. Если не поможет, выключите и включите принтер. ({stderr})"),
            true,
            Severity::Transient,
        )
    }
}
