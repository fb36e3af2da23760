use chrono::{Local, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::AppConfig;
use crate::models::AttendanceRecord;

/// Embed accent colors, one per delivery mood.
pub mod colors {
    pub const SUCCESS: u32 = 0x27ae60;
    pub const ERROR: u32 = 0xe74c3c;
    pub const WARNING: u32 = 0xf39c12;
    pub const INFO: u32 = 0x3498db;
}

const NO_DATA: &str = "No disponible";

/// Webhook wire format. Field names are the sink's, hence no renaming.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    pub username: String,
    pub avatar_url: String,
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

impl WebhookMessage {
    /// Render an attendance record as a single success embed. Dates are
    /// formatted for es-ES readers in the machine's local timezone.
    pub fn attendance(record: &AttendanceRecord, config: &AppConfig) -> Self {
        let captured_local = record.captured_at.with_timezone(&Local);

        let tech_types = if record.tech_types.is_empty() {
            NO_DATA.to_string()
        } else {
            record.tech_types.join(", ")
        };

        let status = if record.source_is_physical_tag {
            "✅ Tag Real Leído"
        } else {
            "✅ Registrado exitosamente"
        };

        let fields = vec![
            inline_field("📱 ID del Tag", record.tag_id.clone()),
            inline_field(
                "⏰ Fecha y Hora",
                captured_local.format("%-d/%-m/%Y, %-H:%M:%S").to_string(),
            ),
            inline_field("🔧 Tecnologías", tech_types),
            inline_field("👤 Usuario", record.user_email.clone()),
            inline_field("📍 Ubicación", record.location.clone()),
            inline_field("📊 Estado", status.to_string()),
        ];

        WebhookMessage {
            username: config.bot_name.clone(),
            avatar_url: config.bot_avatar.clone(),
            embeds: vec![Embed {
                title: "🎯 Asistencia Registrada (Tag Real)".to_string(),
                description: "Se ha registrado una nueva asistencia mediante NFC con tag real"
                    .to_string(),
                color: colors::SUCCESS,
                fields,
                footer: EmbedFooter {
                    text: format!(
                        "Sistema de Asistencia NFC • Tag Real • {}",
                        Local::now().format("%-d/%-m/%Y")
                    ),
                },
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            }],
        }
    }
}

fn inline_field(name: &str, value: String) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value,
        inline: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceInfo;
    use crate::models::TagDescriptor;

    fn record_for(tag: TagDescriptor) -> AttendanceRecord {
        AttendanceRecord::build(&tag, None, &DeviceInfo::collect())
    }

    #[test]
    fn message_carries_bot_identity_and_success_color() {
        let config = AppConfig::default();
        let record = record_for(TagDescriptor::new("04A3F2", vec!["Ndef".into()]));
        let message = WebhookMessage::attendance(&record, &config);

        assert_eq!(message.username, "NFC Attendance Bot");
        assert_eq!(message.avatar_url, config.bot_avatar);
        assert_eq!(message.embeds.len(), 1);

        let embed = &message.embeds[0];
        assert_eq!(embed.title, "🎯 Asistencia Registrada (Tag Real)");
        assert_eq!(embed.color, colors::SUCCESS);
        assert!(embed.footer.text.starts_with("Sistema de Asistencia NFC"));
    }

    #[test]
    fn fields_mirror_the_record() {
        let config = AppConfig::default();
        let record = record_for(TagDescriptor::new(
            "04A3F2",
            vec!["Ndef".into(), "NfcA".into()],
        ));
        let embed = &WebhookMessage::attendance(&record, &config).embeds[0];

        let value_of = |name: &str| {
            embed
                .fields
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.value.clone())
                .unwrap()
        };

        assert_eq!(embed.fields.len(), 6);
        assert!(embed.fields.iter().all(|f| f.inline));
        assert_eq!(value_of("📱 ID del Tag"), "04A3F2");
        assert_eq!(value_of("🔧 Tecnologías"), "Ndef, NfcA");
        assert_eq!(value_of("👤 Usuario"), "usuario@demo.com");
        assert_eq!(value_of("📍 Ubicación"), "Oficina Principal");
        assert_eq!(value_of("📊 Estado"), "✅ Tag Real Leído");
    }

    #[test]
    fn missing_tech_types_render_the_fallback() {
        let config = AppConfig::default();
        let record = record_for(TagDescriptor::new("04A3F2", vec![]));
        let embed = &WebhookMessage::attendance(&record, &config).embeds[0];

        let tech = embed
            .fields
            .iter()
            .find(|f| f.name == "🔧 Tecnologías")
            .unwrap();
        assert_eq!(tech.value, "No disponible");
    }

    #[test]
    fn wire_shape_uses_the_sink_field_names() {
        let config = AppConfig::default();
        let record = record_for(TagDescriptor::new("04A3F2", vec!["Ndef".into()]));
        let json = serde_json::to_value(WebhookMessage::attendance(&record, &config)).unwrap();

        assert!(json.get("username").is_some());
        assert!(json.get("avatar_url").is_some());
        let embed = &json["embeds"][0];
        assert!(embed.get("color").is_some());
        assert!(embed.get("timestamp").is_some());
        assert!(embed["fields"][0].get("inline").is_some());
        assert!(embed["footer"].get("text").is_some());
    }
}
