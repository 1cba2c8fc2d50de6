//! Syslog domain (`spec.md` §3.3). Wire key: `syslogFields`. `syslog_sdata`
//! is the RFC-5424 structured-data string verbatim (`evel_syslog.c`'s
//! `syslogSData` is a single opaque string, not a name/value array); the
//! name/value array the schema does carry is `additionalFields`.

use crate::option::Field;

use super::NameValuePair;

/// RFC 5424 facility codes. The collector schema carries these as their
/// numeric codes, not their textual names (`evel_syslog.c`'s
/// `EVEL_CT_ASSERT(EVEL_SYSLOG_FACILITY_KERNEL == 0)` pins `Kern` to 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyslogFacility {
    Kern,
    User,
    Mail,
    Daemon,
    Auth,
    Syslog,
    Lpr,
    News,
    Uucp,
    Cron,
    AuthPriv,
    Ftp,
    Ntp,
    Security,
    Console,
    SolarisCron,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
}

impl SyslogFacility {
    /// The wire value: the facility's RFC-5424 numeric code, not its name
    /// (`evel_syslog.c:408`'s `evel_enc_kv_opt_int(jbuf, "syslogFacility",
    /// &event->syslog_facility)`).
    pub fn rfc5424_code(self) -> i64 {
        match self {
            SyslogFacility::Kern => 0,
            SyslogFacility::User => 1,
            SyslogFacility::Mail => 2,
            SyslogFacility::Daemon => 3,
            SyslogFacility::Auth => 4,
            SyslogFacility::Syslog => 5,
            SyslogFacility::Lpr => 6,
            SyslogFacility::News => 7,
            SyslogFacility::Uucp => 8,
            SyslogFacility::Cron => 9,
            SyslogFacility::AuthPriv => 10,
            SyslogFacility::Ftp => 11,
            SyslogFacility::Ntp => 12,
            SyslogFacility::Security => 13,
            SyslogFacility::Console => 14,
            SyslogFacility::SolarisCron => 15,
            SyslogFacility::Local0 => 16,
            SyslogFacility::Local1 => 17,
            SyslogFacility::Local2 => 18,
            SyslogFacility::Local3 => 19,
            SyslogFacility::Local4 => 20,
            SyslogFacility::Local5 => 21,
            SyslogFacility::Local6 => 22,
            SyslogFacility::Local7 => 23,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyslogFields {
    pub event_source_type: String,
    pub syslog_msg: String,
    pub syslog_tag: String,
    pub event_source_host: Field<String>,
    pub syslog_facility: Field<SyslogFacility>,
    pub syslog_proc: Field<String>,
    pub syslog_proc_id: Field<i64>,
    pub syslog_sdata: Field<String>,
    pub syslog_severity: Field<String>,
    pub syslog_ver: Field<i64>,
    pub additional_fields: Vec<NameValuePair>,
}

impl SyslogFields {
    pub fn new(
        event_source_type: impl Into<String>,
        syslog_msg: impl Into<String>,
        syslog_tag: impl Into<String>,
    ) -> Self {
        SyslogFields {
            event_source_type: event_source_type.into(),
            syslog_msg: syslog_msg.into(),
            syslog_tag: syslog_tag.into(),
            event_source_host: Field::unset(),
            syslog_facility: Field::unset(),
            syslog_proc: Field::unset(),
            syslog_proc_id: Field::unset(),
            syslog_sdata: Field::unset(),
            syslog_severity: Field::unset(),
            syslog_ver: Field::unset(),
            additional_fields: Vec::new(),
        }
    }

    pub fn add_additional_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        super::push_info(&mut self.additional_fields, name, value);
    }
}
