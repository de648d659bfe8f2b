use serde::{Deserialize, Serialize};
use url::Url;

use super::FileType;
use crate::error::{Result, WidgetError};

/// Office document family, which keys the priority table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeKind {
    Word,
    Excel,
    PowerPoint,
}

impl OfficeKind {
    pub fn name(self) -> &'static str {
        match self {
            OfficeKind::Word => "word",
            OfficeKind::Excel => "excel",
            OfficeKind::PowerPoint => "powerpoint",
        }
    }

    /// Type code of the kdocs preview service.
    fn wps_code(self) -> &'static str {
        match self {
            OfficeKind::Word => "wps",
            OfficeKind::Excel => "et",
            OfficeKind::PowerPoint => "wpp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerKind {
    GoogleDocs,
    WpsCloud,
    MicrosoftOffice,
    Office365Embed,
    TencentDocs,
}

impl ViewerKind {
    /// Declaration order; ties in the priority table keep this order.
    pub const ALL: [ViewerKind; 5] = [
        ViewerKind::GoogleDocs,
        ViewerKind::WpsCloud,
        ViewerKind::MicrosoftOffice,
        ViewerKind::Office365Embed,
        ViewerKind::TencentDocs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewerKind::GoogleDocs => "Google Docs",
            ViewerKind::WpsCloud => "WPS云文档",
            ViewerKind::MicrosoftOffice => "Microsoft Office",
            ViewerKind::Office365Embed => "Office365嵌入",
            ViewerKind::TencentDocs => "腾讯文档",
        }
    }

    /// Lower sorts first. `None` is the default column.
    pub fn priority(self, kind: Option<OfficeKind>) -> u8 {
        match (self, kind) {
            (ViewerKind::GoogleDocs, Some(OfficeKind::Word | OfficeKind::PowerPoint)) => 2,
            (ViewerKind::GoogleDocs, _) => 3,
            (ViewerKind::WpsCloud, _) => 2,
            (ViewerKind::MicrosoftOffice, _) => 4,
            (ViewerKind::Office365Embed, _) => 5,
            (ViewerKind::TencentDocs, _) => 6,
        }
    }

    pub fn is_wps(self) -> bool {
        self == ViewerKind::WpsCloud
    }

    /// Frame sandbox flags. WPS frames may navigate the top window.
    pub fn sandbox(self) -> &'static str {
        if self.is_wps() {
            "allow-scripts allow-same-origin allow-popups allow-forms allow-top-navigation"
        } else {
            "allow-scripts allow-same-origin allow-popups allow-forms"
        }
    }

    /// Preview URL for `file_url`. Tencent takes the extension-level type
    /// (`docx`, `xls`), WPS the kdocs code of the office family.
    pub fn viewer_url(self, file_url: &str, file_type: FileType) -> Result<String> {
        let kind = office_kind(file_type)?;
        let url = match self {
            ViewerKind::GoogleDocs => Url::parse_with_params(
                "https://docs.google.com/gview",
                &[("url", file_url), ("embedded", "true")],
            )?,
            ViewerKind::WpsCloud => return wps_viewer_url(file_url, kind),
            ViewerKind::MicrosoftOffice => Url::parse_with_params(
                "https://view.officeapps.live.com/op/view.aspx",
                &[("src", file_url)],
            )?,
            ViewerKind::Office365Embed => Url::parse_with_params(
                "https://view.officeapps.live.com/op/embed.aspx",
                &[("src", file_url)],
            )?,
            ViewerKind::TencentDocs => Url::parse_with_params(
                "https://docs.qq.com/api/preview",
                &[("url", file_url), ("type", file_type.name()), ("embedded", "true")],
            )?,
        };
        Ok(url.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerCandidate {
    pub kind: ViewerKind,
    pub name: String,
    pub url: String,
    pub sandbox: String,
}

impl ViewerCandidate {
    pub fn new(kind: ViewerKind, file_url: &str, file_type: FileType) -> Result<Self> {
        Ok(Self {
            kind,
            name: kind.name().to_string(),
            url: kind.viewer_url(file_url, file_type)?,
            sandbox: kind.sandbox().to_string(),
        })
    }
}

fn office_kind(file_type: FileType) -> Result<OfficeKind> {
    file_type
        .office_kind()
        .ok_or_else(|| WidgetError::Unknown(format!("{file_type} is not an office type")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Host {
    Wps,
    Tencent,
    Microsoft,
    Other,
}

fn is_wps_link(file_url: &str) -> bool {
    file_url.contains("kdocs.cn") || file_url.contains("wps.cn")
}

fn classify(file_url: &str) -> Host {
    if is_wps_link(file_url) {
        Host::Wps
    } else if file_url.contains("docs.qq.com") {
        Host::Tencent
    } else if file_url.contains("office.com") || file_url.contains("sharepoint.com") {
        Host::Microsoft
    } else {
        Host::Other
    }
}

/// Preview services to try for `file_url`, best first.
///
/// Links already hosted by WPS, Tencent or Microsoft get that vendor's
/// viewers; anything else is ordered by the priority table.
pub fn rank_viewers(file_url: &str, file_type: FileType) -> Result<Vec<ViewerCandidate>> {
    let kind = office_kind(file_type)?;
    let order: Vec<ViewerKind> = match classify(file_url) {
        Host::Wps => vec![ViewerKind::WpsCloud],
        Host::Tencent => vec![ViewerKind::TencentDocs, ViewerKind::GoogleDocs],
        Host::Microsoft => vec![
            ViewerKind::MicrosoftOffice,
            ViewerKind::Office365Embed,
            ViewerKind::GoogleDocs,
        ],
        Host::Other => {
            let mut all = ViewerKind::ALL.to_vec();
            all.sort_by_key(|viewer| viewer.priority(Some(kind)));
            all
        }
    };
    order
        .into_iter()
        .map(|viewer| ViewerCandidate::new(viewer, file_url, file_type))
        .collect()
}

const SHARE_LINK_PARAMS: [(&str, &str); 10] = [
    ("embed", "1"),
    ("toolbar", "0"),
    ("header", "0"),
    ("menubar", "0"),
    ("statusbar", "0"),
    ("editbar", "0"),
    ("commentbar", "0"),
    ("chrome", "0"),
    ("widget", "0"),
    ("navpane", "0"),
];

/// Sets `params` on the query of `url`: an existing key keeps its place and
/// loses any duplicates, a new key is appended.
fn set_query_params(url: &mut Url, params: &[(&str, &str)]) {
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    for &(key, value) in params {
        match pairs.iter().position(|(k, _)| k == key) {
            Some(first) => {
                pairs[first].1 = value.to_string();
                let mut index = 0;
                pairs.retain(|(k, _)| {
                    let keep = k != key || index == first;
                    index += 1;
                    keep
                });
            }
            None => pairs.push((key.to_string(), value.to_string())),
        }
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

/// The WPS candidate URL.
///
/// A kdocs share link (`kdocs.cn/l/`) gets the full set of embed parameters,
/// any other WPS link a shorter set; both are set on the link's own query.
/// Foreign files go through the kdocs preview service.
pub fn wps_viewer_url(file_url: &str, kind: OfficeKind) -> Result<String> {
    if is_wps_link(file_url) {
        let mut url = Url::parse(file_url)?;
        let params = if file_url.contains("kdocs.cn/l/") {
            &SHARE_LINK_PARAMS[..]
        } else {
            &SHARE_LINK_PARAMS[..6]
        };
        set_query_params(&mut url, params);
        return Ok(url.into());
    }
    let url = Url::parse_with_params(
        "https://www.kdocs.cn/view",
        &[
            ("url", file_url),
            ("type", kind.wps_code()),
            ("mode", "embed"),
            ("toolbar", "0"),
            ("header", "0"),
            ("menubar", "0"),
            ("statusbar", "0"),
            ("editbar", "0"),
            ("chrome", "0"),
        ],
    )?;
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(candidates: &[ViewerCandidate]) -> Vec<ViewerKind> {
        candidates.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn generic_word_file_orders_google_before_wps() {
        let ranked = rank_viewers("https://blog.test/a.docx", FileType::Docx).unwrap();
        assert_eq!(
            kinds(&ranked),
            vec![
                ViewerKind::GoogleDocs,
                ViewerKind::WpsCloud,
                ViewerKind::MicrosoftOffice,
                ViewerKind::Office365Embed,
                ViewerKind::TencentDocs,
            ]
        );
        assert_eq!(
            ranked[0].url,
            "https://docs.google.com/gview?url=https%3A%2F%2Fblog.test%2Fa.docx&embedded=true"
        );
    }

    #[test]
    fn generic_spreadsheet_prefers_wps() {
        let ranked = rank_viewers("https://blog.test/a.xlsx", FileType::Xlsx).unwrap();
        assert_eq!(ranked[0].kind, ViewerKind::WpsCloud);
        assert_eq!(ranked[1].kind, ViewerKind::GoogleDocs);
        assert!(ranked[0].url.starts_with("https://www.kdocs.cn/view?url="));
        assert!(ranked[0].url.contains("&type=et&mode=embed"));
    }

    #[test]
    fn vendor_hosted_links_use_vendor_viewers() {
        let tencent = rank_viewers("https://docs.qq.com/doc/abc", FileType::Doc).unwrap();
        assert_eq!(kinds(&tencent), vec![ViewerKind::TencentDocs, ViewerKind::GoogleDocs]);
        assert!(tencent[0].url.contains("type=doc&embedded=true"));

        let microsoft =
            rank_viewers("https://contoso.sharepoint.com/x.pptx", FileType::Pptx).unwrap();
        assert_eq!(
            kinds(&microsoft),
            vec![
                ViewerKind::MicrosoftOffice,
                ViewerKind::Office365Embed,
                ViewerKind::GoogleDocs
            ]
        );
    }

    #[test]
    fn tencent_viewer_gets_the_file_extension_as_type() {
        for (file_type, expected) in [
            (FileType::Docx, "type=docx"),
            (FileType::Xls, "type=xls"),
            (FileType::Pptx, "type=pptx"),
        ] {
            let url = ViewerKind::TencentDocs
                .viewer_url("https://blog.test/report", file_type)
                .unwrap();
            assert!(
                url.starts_with("https://docs.qq.com/api/preview?url=")
                    && url.contains(&format!("&{expected}&embedded=true")),
                "unexpected Tencent URL {url}"
            );
        }
    }

    #[test]
    fn non_office_types_cannot_be_ranked() {
        assert!(rank_viewers("https://blog.test/a.pdf", FileType::Pdf).is_err());
    }

    #[test]
    fn kdocs_share_link_keeps_its_query_and_sets_embed_params() {
        let ranked =
            rank_viewers("https://www.kdocs.cn/l/abc123?from=share&toolbar=1", FileType::Xlsx)
                .unwrap();
        assert_eq!(ranked.len(), 1);
        let url = Url::parse(&ranked[0].url).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("from".into(), "share".into()));
        assert_eq!(pairs[1], ("toolbar".into(), "0".into()));
        assert!(pairs.contains(&("embed".into(), "1".into())));
        assert!(pairs.contains(&("header".into(), "0".into())));
        assert!(pairs.contains(&("navpane".into(), "0".into())));
        assert_eq!(pairs.len(), 11);
        assert_eq!(ranked[0].sandbox, ViewerKind::WpsCloud.sandbox());
    }

    #[test]
    fn other_wps_links_get_the_short_param_set() {
        let url = wps_viewer_url("https://www.wps.cn/doc?id=1", OfficeKind::Word).unwrap();
        assert_eq!(
            url,
            "https://www.wps.cn/doc?id=1&embed=1&toolbar=0&header=0&menubar=0&statusbar=0&editbar=0"
        );
    }

    #[test]
    fn duplicate_keys_collapse_on_set() {
        let mut url = Url::parse("https://kdocs.cn/x?embed=0&a=1&embed=2").unwrap();
        set_query_params(&mut url, &[("embed", "1")]);
        assert_eq!(url.query(), Some("embed=1&a=1"));
    }
}
