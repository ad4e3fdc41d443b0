use crate::config::ReportConfig;
use crate::error::app_error::AppError;
use crate::models::driver_response::DriverResponse;
use crate::models::equipment::EquipmentItem;
use crate::models::verification_session::VerificationSession;
use crate::util::escape_html;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::borrow::Cow;

const DISPLAY_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// A rendered report, ready to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: String,
    pub html: String,
}

impl Report {
    /// `Content-Disposition` value with an ASCII fallback name and the UTF-8 name.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .filename
            .chars()
            .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(&self.filename)
        )
    }
}

pub struct ReportExporter {
    escape_fields: bool,
    timezone: Tz,
}

impl ReportExporter {
    pub fn new(escape_fields: bool, timezone: Tz) -> Self {
        Self { escape_fields, timezone }
    }

    pub fn from_config(config: &ReportConfig) -> Result<Self, AppError> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Internal(format!("unknown report timezone {}: {}", config.timezone, e)))?;
        Ok(Self::new(config.escape_fields, timezone))
    }

    /// Field values go into the markup verbatim unless escaping is switched on.
    fn field<'s>(&self, value: &'s str) -> Cow<'s, str> {
        if self.escape_fields {
            Cow::Owned(escape_html(value))
        } else {
            Cow::Borrowed(value)
        }
    }

    fn local_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.timezone).format(DISPLAY_FORMAT).to_string()
    }

    pub fn filename(response: &DriverResponse, now: DateTime<Utc>) -> String {
        format!(
            "Raport_{}_{}_{}.html",
            response.driver_name,
            response.truck_plate,
            now.format("%Y-%m-%d")
        )
    }

    fn equipment_rows(&self, items: &[EquipmentItem]) -> String {
        items
            .iter()
            .map(|item| {
                format!(
                    r#"            <tr><td>{mark}</td><td>{name}</td><td>{quantity}</td><td>{comments}</td></tr>"#,
                    mark = if item.checked { "✓" } else { "✗" },
                    name = self.field(&item.name),
                    quantity = item.quantity,
                    comments = self.field(&item.comments),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the Romanian verification report. `signature` is the signature as an inline data URI.
    pub fn render(&self, response: &DriverResponse, session: &VerificationSession, signature: Option<&str>, now: DateTime<Utc>) -> Report {
        let stats = response.completion();
        let generated_at = self.local_time(now);
        let all_checked = response.equipment_checked == response.total_equipment;

        let signature_block = match signature {
            Some(src) => format!(
                r#"<div style="margin-top: 20px;"><strong>Semnătura:</strong><br><img src="{}" alt="Semnătura șoferului" class="signature"></div>"#,
                src
            ),
            None => String::new(),
        };

        let equipment_table = if response.equipment_details.is_empty() {
            String::new()
        } else {
            format!(
                r#"<table class="equipment">
            <tr><th></th><th>Echipament</th><th>Cantitate</th><th>Observații</th></tr>
{}
        </table>"#,
                self.equipment_rows(&response.equipment_details)
            )
        };

        let html = format!(
            r##"<!DOCTYPE html>
<html lang="ro">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Raport Verificare - {driver_name}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; line-height: 1.6; }}
        .header {{ text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 30px; }}
        .section {{ margin-bottom: 30px; }}
        .section h2 {{ color: #333; border-bottom: 1px solid #ccc; padding-bottom: 10px; }}
        .info-item {{ display: flex; justify-content: space-between; padding: 5px 0; border-bottom: 1px dotted #ccc; }}
        .signature {{ max-width: 200px; max-height: 100px; object-fit: contain; border: 1px solid #ddd; }}
        .status-completed {{ color: green; font-weight: bold; }}
        .status-pending {{ color: orange; font-weight: bold; }}
        .equipment {{ width: 100%; border-collapse: collapse; }}
        .equipment td, .equipment th {{ border-bottom: 1px dotted #ccc; padding: 5px; text-align: left; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>RAPORT VERIFICARE CAMION</h1>
        <p><strong>Compania:</strong> {company_name}</p>
        <p><strong>Sesiunea:</strong> {session_name}</p>
        <p>Generat la: {generated_at}</p>
    </div>

    <div class="section">
        <h2>👤 INFORMAȚII ȘOFER</h2>
        <div class="info-item"><span>Nume complet:</span><strong>{driver_name}</strong></div>
        <div class="info-item"><span>Telefon:</span><span>{phone}</span></div>
        <div class="info-item"><span>CI/Pașaport:</span><span>{id_number}</span></div>
        <div class="info-item"><span>Camion:</span><span>{truck}</span></div>
        <div class="info-item"><span>Data completării:</span><span>{completed_at}</span></div>
        {signature_block}
    </div>

    <div class="section">
        <h2>📦 ECHIPAMENTE VERIFICATE</h2>
        <p><strong>Status:</strong> {checked}/{total} echipamente verificate ({percentage}%)</p>
        <p class="{status_class}">
            {status_text}
        </p>
        {equipment_table}
    </div>

    <div class="section" style="text-align: center; margin-top: 50px;">
        <p style="font-size: 12px; color: #666;">
            Acest raport a fost generat automat de Sistemul de Verificare Camioane<br>
            Generat la: {generated_at}
        </p>
    </div>
</body>
</html>
"##,
            driver_name = self.field(&response.driver_name),
            company_name = self.field(&session.company_name),
            session_name = self.field(&session.session_name),
            generated_at = generated_at,
            phone = self.field(&response.phone),
            id_number = self.field(&response.id_number),
            truck = self.field(&response.truck_plate),
            completed_at = self.local_time(response.completed_at),
            signature_block = signature_block,
            checked = stats.completed,
            total = stats.total,
            percentage = stats.percentage,
            status_class = if all_checked { "status-completed" } else { "status-pending" },
            status_text = if all_checked {
                "✓ Toate echipamentele au fost verificate"
            } else {
                "⚠ Verificare incompletă"
            },
            equipment_table = equipment_table,
        );

        Report {
            filename: Self::filename(response, now),
            html,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver_response::ResponseStatus;
    use crate::models::equipment::default_checklist;
    use crate::test_utils::sample_session;
    use chrono::TimeZone;

    fn response(checked: u32, driver_name: &str) -> DriverResponse {
        let mut equipment = default_checklist();
        equipment.iter_mut().take(checked as usize).for_each(|item| item.checked = true);
        DriverResponse {
            id: "1703123999999".to_string(),
            session_id: "1703123456789".to_string(),
            driver_name: driver_name.to_string(),
            phone: "+40 700 000 000".to_string(),
            id_number: "RX123456".to_string(),
            signature: None,
            truck_plate: "B-123-ABC".to_string(),
            truck_model: "Volvo FH".to_string(),
            completed_at: Utc.with_ymd_and_hms(2026, 7, 1, 9, 15, 30).unwrap(),
            equipment_checked: checked,
            total_equipment: 10,
            status: ResponseStatus::Completed,
            equipment_details: equipment,
        }
    }

    fn exporter(escape_fields: bool) -> ReportExporter {
        ReportExporter::new(escape_fields, chrono_tz::Europe::Bucharest)
    }

    #[test]
    fn report_carries_driver_and_completion() {
        let now = Utc.with_ymd_and_hms(2026, 7, 2, 21, 30, 0).unwrap();
        let session = sample_session("1703123456789", "company-a", now);

        let report = exporter(false).render(&response(10, "Ion Popescu"), &session, Some("data:image/png;base64,AAAA"), now);

        assert!(report.html.contains("<title>Raport Verificare - Ion Popescu</title>"));
        assert!(report.html.contains("10/10 echipamente verificate (100%)"));
        assert!(report.html.contains("✓ Toate echipamentele au fost verificate"));
        assert!(report.html.contains(r#"<img src="data:image/png;base64,AAAA""#));
        assert!(report.html.contains("Trusa de prim ajutor"));
        // 09:15:30 UTC is 12:15:30 in Bucharest during summer time.
        assert!(report.html.contains("01.07.2026, 12:15:30"));
        assert!(report.html.contains("Generat la: 03.07.2026, 00:30:00"));
    }

    #[test]
    fn incomplete_checklist_is_flagged() {
        let now = Utc::now();
        let session = sample_session("1703123456789", "company-a", now);

        let report = exporter(false).render(&response(7, "Ion Popescu"), &session, None, now);

        assert!(report.html.contains("7/10 echipamente verificate (70%)"));
        assert!(report.html.contains("⚠ Verificare incompletă"));
        assert!(!report.html.contains("Semnătura:"));
    }

    #[test]
    fn fields_are_verbatim_unless_escaping_is_enabled() {
        let now = Utc::now();
        let session = sample_session("1703123456789", "company-a", now);
        let driver = response(10, "<b>Ion</b>");

        let raw = exporter(false).render(&driver, &session, None, now);
        assert!(raw.html.contains("<strong><b>Ion</b></strong>"));

        let escaped = exporter(true).render(&driver, &session, None, now);
        assert!(escaped.html.contains("<strong>&lt;b&gt;Ion&lt;/b&gt;</strong>"));
    }

    #[test]
    fn filename_uses_driver_plate_and_date() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 59, 0).unwrap();
        let session = sample_session("1703123456789", "company-a", now);

        let report = exporter(false).render(&response(10, "Ștefan Ion"), &session, None, now);

        assert_eq!(report.filename, "Raport_Ștefan Ion_B-123-ABC_2026-10-19.html");
        assert_eq!(
            report.content_disposition(),
            "attachment; filename=\"Raport__tefan_Ion_B-123-ABC_2026-10-19.html\"; filename*=UTF-8''Raport_%C8%98tefan%20Ion_B-123-ABC_2026-10-19.html"
        );
    }

    #[test]
    fn timezone_comes_from_config() {
        assert!(ReportExporter::from_config(&ReportConfig::default()).is_ok());
        let bad = ReportConfig {
            timezone: "Mars/Olympus".to_string(),
            ..ReportConfig::default()
        };
        assert!(matches!(ReportExporter::from_config(&bad), Err(AppError::Internal(_))));
    }
}
