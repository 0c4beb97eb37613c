//! Presentation template scaffold.
//!
//! Builds the smallest deck PowerPoint opens without repair that still offers
//! every layout the resolver looks for: one master with "Title Slide",
//! "Title and Content", "Title Only" and "Blank" layouts, a theme, and a
//! notes master so speaker notes have somewhere to go.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, namespace, relationship_type as rt};
use crate::ooxml::opc::rel::escape_xml;
use crate::ooxml::opc::{OpcError, OpcPackage, PackURI, Part};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Widescreen 13.333in x 7.5in
const SLIDE_CX: i64 = 12_192_000;
const SLIDE_CY: i64 = 6_858_000;

const CLR_MAP: &str = r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#;

const GROUP_PROPERTIES: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

const FONT_REFS_MAJOR: &str =
    r#"<a:latin typeface="+mj-lt"/><a:ea typeface="+mj-ea"/><a:cs typeface="+mj-cs"/>"#;
const FONT_REFS_MINOR: &str =
    r#"<a:latin typeface="+mn-lt"/><a:ea typeface="+mn-ea"/><a:cs typeface="+mn-cs"/>"#;

/// Position and size in EMUs.
#[derive(Clone, Copy)]
struct Xfrm(i64, i64, i64, i64);

/// A placeholder shape as written into a master or layout.
struct PlaceholderSpec<'a> {
    name: &'a str,
    /// Attributes of `<p:ph>`, already formatted
    ph_attrs: &'a str,
    xfrm: Option<Xfrm>,
    body_pr: &'a str,
    lst_style: &'a str,
    prompt: &'a str,
}

impl PlaceholderSpec<'_> {
    fn write(&self, xml: &mut String, id: u32) {
        xml.push_str("<p:sp><p:nvSpPr>");
        xml.push_str(&format!(r#"<p:cNvPr id="{}" name="{}"/>"#, id, escape_xml(self.name)));
        xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
        xml.push_str(&format!("<p:nvPr><p:ph {}/></p:nvPr>", self.ph_attrs));
        xml.push_str("</p:nvSpPr>");

        match self.xfrm {
            Some(Xfrm(x, y, cx, cy)) => xml.push_str(&format!(
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#
            )),
            None => xml.push_str("<p:spPr/>"),
        }

        xml.push_str("<p:txBody>");
        xml.push_str(self.body_pr);
        xml.push_str(self.lst_style);
        if self.prompt.is_empty() {
            xml.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
        } else if self.ph_attrs.contains("sldNum") {
            xml.push_str(&format!(
                r#"<a:p><a:fld id="{{B6F15528-21DE-4FAA-801E-634DDDAF4B2B}}" type="slidenum"><a:rPr lang="en-US"/><a:t>{}</a:t></a:fld><a:endParaRPr lang="en-US"/></a:p>"#,
                escape_xml(self.prompt)
            ));
        } else {
            xml.push_str(&format!(
                r#"<a:p><a:r><a:rPr lang="en-US"/><a:t>{}</a:t></a:r><a:endParaRPr lang="en-US"/></a:p>"#,
                escape_xml(self.prompt)
            ));
        }
        xml.push_str("</p:txBody></p:sp>");
    }
}

fn furniture(idx_offset: u32) -> [PlaceholderSpec<'static>; 3] {
    let (dt, ftr, num) = match idx_offset {
        0 => (
            r#"type="dt" sz="half" idx="2""#,
            r#"type="ftr" sz="quarter" idx="3""#,
            r#"type="sldNum" sz="quarter" idx="4""#,
        ),
        _ => (
            r#"type="dt" sz="half" idx="10""#,
            r#"type="ftr" sz="quarter" idx="11""#,
            r#"type="sldNum" sz="quarter" idx="12""#,
        ),
    };
    let on_master = idx_offset == 0;
    [
        PlaceholderSpec {
            name: "Date Placeholder",
            ph_attrs: dt,
            xfrm: on_master.then_some(Xfrm(838_200, 6_356_350, 2_743_200, 365_125)),
            body_pr: r#"<a:bodyPr/>"#,
            lst_style: "<a:lstStyle/>",
            prompt: "",
        },
        PlaceholderSpec {
            name: "Footer Placeholder",
            ph_attrs: ftr,
            xfrm: on_master.then_some(Xfrm(4_038_600, 6_356_350, 4_114_800, 365_125)),
            body_pr: r#"<a:bodyPr/>"#,
            lst_style: "<a:lstStyle/>",
            prompt: "",
        },
        PlaceholderSpec {
            name: "Slide Number Placeholder",
            ph_attrs: num,
            xfrm: on_master.then_some(Xfrm(8_610_600, 6_356_350, 2_743_200, 365_125)),
            body_pr: r#"<a:bodyPr/>"#,
            lst_style: "<a:lstStyle/>",
            prompt: "‹#›",
        },
    ]
}

fn root_open(element: &str, extra_attrs: &str) -> String {
    format!(
        r#"{XML_DECL}<p:{element} xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"{extra_attrs}>"#,
        namespace::DML_MAIN,
        namespace::OFC_RELATIONSHIPS,
        namespace::PML_MAIN,
    )
}

fn shape_tree(specs: &[PlaceholderSpec<'_>]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str("<p:spTree>");
    xml.push_str(GROUP_PROPERTIES);
    for (i, spec) in specs.iter().enumerate() {
        spec.write(&mut xml, i as u32 + 2);
    }
    xml.push_str("</p:spTree>");
    xml
}

fn level1_style(tag: &str, attrs: &str, inner: &str, size: u32, fonts: &str) -> String {
    format!(
        r#"<a:{tag} {attrs} defTabSz="914400" rtl="0" eaLnBrk="1" latinLnBrk="0" hangingPunct="1">{inner}<a:defRPr sz="{size}" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>{fonts}</a:defRPr></a:{tag}>"#
    )
}

fn presentation_xml() -> String {
    let mut xml = root_open("presentation", r#" saveSubsetFonts="1""#);
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    xml.push_str(r#"<p:notesMasterIdLst><p:notesMasterId r:id="rId2"/></p:notesMasterIdLst>"#);
    xml.push_str(&format!(r#"<p:sldSz cx="{SLIDE_CX}" cy="{SLIDE_CY}"/>"#));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str(r#"<p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr>"#);
    xml.push_str(&level1_style(
        "lvl1pPr",
        r#"marL="0" algn="l""#,
        "",
        1800,
        FONT_REFS_MINOR,
    ));
    xml.push_str("</p:defaultTextStyle>");
    xml.push_str("</p:presentation>");
    xml
}

fn slide_master_xml(layout_count: usize) -> String {
    let mut specs = vec![
        PlaceholderSpec {
            name: "Title Placeholder 1",
            ph_attrs: r#"type="title""#,
            xfrm: Some(Xfrm(838_200, 365_125, 10_515_600, 1_325_563)),
            body_pr: r#"<a:bodyPr vert="horz" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0" anchor="ctr"><a:normAutofit/></a:bodyPr>"#,
            lst_style: "<a:lstStyle/>",
            prompt: "Click to edit Master title style",
        },
        PlaceholderSpec {
            name: "Text Placeholder 2",
            ph_attrs: r#"type="body" idx="1""#,
            xfrm: Some(Xfrm(838_200, 1_825_625, 10_515_600, 4_351_338)),
            body_pr: r#"<a:bodyPr vert="horz" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0"><a:normAutofit/></a:bodyPr>"#,
            lst_style: "<a:lstStyle/>",
            prompt: "Click to edit Master text styles",
        },
    ];
    specs.extend(furniture(0));

    let mut xml = root_open("sldMaster", "");
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str(&shape_tree(&specs));
    xml.push_str("</p:cSld>");
    xml.push_str(CLR_MAP);

    xml.push_str("<p:sldLayoutIdLst>");
    for i in 0..layout_count {
        xml.push_str(&format!(
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2_147_483_649u64 + i as u64,
            i + 1
        ));
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles>");
    xml.push_str("<p:titleStyle>");
    xml.push_str(&level1_style(
        "lvl1pPr",
        r#"algn="l""#,
        r#"<a:lnSpc><a:spcPct val="90000"/></a:lnSpc><a:spcBef><a:spcPct val="0"/></a:spcBef><a:buNone/>"#,
        4400,
        FONT_REFS_MAJOR,
    ));
    xml.push_str("</p:titleStyle>");
    xml.push_str("<p:bodyStyle>");
    xml.push_str(&level1_style(
        "lvl1pPr",
        r#"marL="228600" indent="-228600" algn="l""#,
        r#"<a:lnSpc><a:spcPct val="90000"/></a:lnSpc><a:spcBef><a:spcPts val="1000"/></a:spcBef><a:buFont typeface="Arial" panose="020B0604020202020204" pitchFamily="34" charset="0"/><a:buChar char="•"/>"#,
        2800,
        FONT_REFS_MINOR,
    ));
    xml.push_str("</p:bodyStyle>");
    xml.push_str(r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr>"#);
    xml.push_str(&level1_style("lvl1pPr", r#"marL="0" algn="l""#, "", 1800, FONT_REFS_MINOR));
    xml.push_str("</p:otherStyle>");
    xml.push_str("</p:txStyles>");

    xml.push_str("</p:sldMaster>");
    xml
}

/// Name, layout `type`, and non-furniture placeholders of each scaffold layout.
fn layout_specs() -> Vec<(&'static str, &'static str, Vec<PlaceholderSpec<'static>>)> {
    let title = || PlaceholderSpec {
        name: "Title 1",
        ph_attrs: r#"type="title""#,
        xfrm: None,
        body_pr: "<a:bodyPr/>",
        lst_style: "<a:lstStyle/>",
        prompt: "Click to edit Master title style",
    };

    vec![
        (
            "Title Slide",
            "title",
            vec![
                PlaceholderSpec {
                    name: "Title 1",
                    ph_attrs: r#"type="ctrTitle""#,
                    xfrm: Some(Xfrm(1_524_000, 1_122_363, 9_144_000, 2_387_600)),
                    body_pr: r#"<a:bodyPr anchor="b"/>"#,
                    lst_style: r#"<a:lstStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="6000"/></a:lvl1pPr></a:lstStyle>"#,
                    prompt: "Click to edit Master title style",
                },
                PlaceholderSpec {
                    name: "Subtitle 2",
                    ph_attrs: r#"type="subTitle" idx="1""#,
                    xfrm: Some(Xfrm(1_524_000, 3_602_038, 9_144_000, 1_655_762)),
                    body_pr: "<a:bodyPr/>",
                    lst_style: r#"<a:lstStyle><a:lvl1pPr marL="0" indent="0" algn="ctr"><a:buNone/><a:defRPr sz="2400"/></a:lvl1pPr></a:lstStyle>"#,
                    prompt: "Click to edit Master subtitle style",
                },
            ],
        ),
        (
            "Title and Content",
            "obj",
            vec![
                title(),
                PlaceholderSpec {
                    name: "Content Placeholder 2",
                    ph_attrs: r#"idx="1""#,
                    xfrm: None,
                    body_pr: "<a:bodyPr/>",
                    lst_style: "<a:lstStyle/>",
                    prompt: "Click to edit Master text styles",
                },
            ],
        ),
        ("Title Only", "titleOnly", vec![title()]),
        ("Blank", "blank", vec![]),
    ]
}

fn slide_layout_xml(name: &str, layout_type: &str, mut specs: Vec<PlaceholderSpec<'_>>) -> String {
    specs.extend(furniture(10));

    let mut xml = root_open(
        "sldLayout",
        &format!(r#" type="{layout_type}" preserve="1""#),
    );
    xml.push_str(&format!(r#"<p:cSld name="{}">"#, escape_xml(name)));
    xml.push_str(&shape_tree(&specs));
    xml.push_str("</p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sldLayout>");
    xml
}

fn notes_master_xml() -> String {
    let specs = [
        PlaceholderSpec {
            name: "Slide Image Placeholder 1",
            ph_attrs: r#"type="sldImg""#,
            xfrm: Some(Xfrm(685_800, 1_143_000, 5_486_400, 3_086_100)),
            body_pr: "<a:bodyPr/>",
            lst_style: "<a:lstStyle/>",
            prompt: "",
        },
        PlaceholderSpec {
            name: "Notes Placeholder 2",
            ph_attrs: r#"type="body" sz="quarter" idx="1""#,
            xfrm: Some(Xfrm(685_800, 4_400_550, 5_486_400, 3_600_450)),
            body_pr: "<a:bodyPr/>",
            lst_style: "<a:lstStyle/>",
            prompt: "Click to edit Master text styles",
        },
    ];

    let mut xml = root_open("notesMaster", "");
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str(&shape_tree(&specs));
    xml.push_str("</p:cSld>");
    xml.push_str(CLR_MAP);
    xml.push_str("<p:notesStyle>");
    xml.push_str(&level1_style("lvl1pPr", r#"marL="0" algn="l""#, "", 1200, FONT_REFS_MINOR));
    xml.push_str("</p:notesStyle>");
    xml.push_str("</p:notesMaster>");
    xml
}

fn theme_xml(name: &str) -> String {
    let accents = [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ];

    let mut xml = format!(
        r#"{XML_DECL}<a:theme xmlns:a="{}" name="{}"><a:themeElements>"#,
        namespace::DML_MAIN,
        escape_xml(name)
    );

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (slot, rgb) in accents {
        xml.push_str(&format!(r#"<a:{slot}><a:srgbClr val="{rgb}"/></a:{slot}>"#));
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    xml.push_str(r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#);
    xml.push_str(r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#);
    xml.push_str("</a:fontScheme>");

    let solid = |modifier: &str| {
        format!(r#"<a:solidFill><a:schemeClr val="phClr">{modifier}</a:schemeClr></a:solidFill>"#)
    };
    xml.push_str(r#"<a:fmtScheme name="Office"><a:fillStyleLst>"#);
    xml.push_str(&solid(""));
    xml.push_str(&solid(r#"<a:tint val="50000"/>"#));
    xml.push_str(&solid(r#"<a:shade val="80000"/>"#));
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        xml.push_str(&format!(r#"<a:ln w="{width}">{}</a:ln>"#, solid("")));
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    xml.push_str(&solid(""));
    xml.push_str(&solid(r#"<a:tint val="95000"/>"#));
    xml.push_str(&solid(r#"<a:shade val="90000"/>"#));
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>");
    xml
}

fn core_properties_xml(title: &str) -> String {
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><cp:revision>1</cp:revision></cp:coreProperties>"#,
        escape_xml(title)
    )
}

fn app_properties_xml() -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><Application>docgen</Application><PresentationFormat>Widescreen</PresentationFormat><Slides>0</Slides></Properties>"#
    )
}

fn uri(s: &str) -> Result<PackURI> {
    Ok(PackURI::new(s).map_err(OpcError::InvalidPackUri)?)
}

/// A complete, slide-less template deck titled `title`, as .pptx bytes.
pub fn scaffold_template_titled(title: &str) -> Result<Vec<u8>> {
    let mut pkg = OpcPackage::new();

    let presentation = uri("/ppt/presentation.xml")?;
    let master = uri("/ppt/slideMasters/slideMaster1.xml")?;
    let notes_master = uri("/ppt/notesMasters/notesMaster1.xml")?;
    let theme = uri("/ppt/theme/theme1.xml")?;
    let notes_theme = uri("/ppt/theme/theme2.xml")?;
    let core = uri("/docProps/core.xml")?;
    let app = uri("/docProps/app.xml")?;

    pkg.rels_mut().get_or_add(rt::OFFICE_DOCUMENT, &presentation);
    pkg.rels_mut().get_or_add(rt::CORE_PROPERTIES, &core);
    pkg.rels_mut().get_or_add(rt::EXTENDED_PROPERTIES, &app);
    pkg.add_part(Part::new(core, ct::OPC_CORE_PROPERTIES, core_properties_xml(title).into_bytes()));
    pkg.add_part(Part::new(app, ct::OFC_EXTENDED_PROPERTIES, app_properties_xml().into_bytes()));

    // presentation.xml refers to the master as rId1 and the notes master as rId2
    let mut pres_part = Part::new(
        presentation,
        ct::PML_PRESENTATION_MAIN,
        presentation_xml().into_bytes(),
    );
    pres_part.relate_to(&master, rt::SLIDE_MASTER);
    pres_part.relate_to(&notes_master, rt::NOTES_MASTER);

    let side_parts = [
        ("/ppt/presProps.xml", ct::PML_PRES_PROPS, rt::PRES_PROPS, "presentationPr", ""),
        (
            "/ppt/viewProps.xml",
            ct::PML_VIEW_PROPS,
            rt::VIEW_PROPS,
            "viewPr",
            r#"<p:normalViewPr><p:restoredLeft sz="15620"/><p:restoredTop sz="94660"/></p:normalViewPr><p:gridSpacing cx="76200" cy="76200"/>"#,
        ),
    ];
    for (partname, content_type, reltype, element, body) in side_parts {
        let partname = uri(partname)?;
        let xml = format!("{}{}</p:{}>", root_open(element, ""), body, element);
        pres_part.relate_to(&partname, reltype);
        pkg.add_part(Part::new(partname, content_type, xml.into_bytes()));
    }

    pres_part.relate_to(&theme, rt::THEME);
    let table_styles = uri("/ppt/tableStyles.xml")?;
    pres_part.relate_to(&table_styles, rt::TABLE_STYLES);
    pkg.add_part(Part::new(
        table_styles,
        ct::PML_TABLE_STYLES,
        format!(
            r#"{XML_DECL}<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
            namespace::DML_MAIN
        )
        .into_bytes(),
    ));
    pkg.add_part(pres_part);

    let layouts = layout_specs();
    let mut master_part = Part::new(
        master.clone(),
        ct::PML_SLIDE_MASTER,
        slide_master_xml(layouts.len()).into_bytes(),
    );
    for (i, (name, layout_type, specs)) in layouts.into_iter().enumerate() {
        let partname = uri(&format!("/ppt/slideLayouts/slideLayout{}.xml", i + 1))?;
        master_part.relate_to(&partname, rt::SLIDE_LAYOUT);

        let mut layout_part = Part::new(
            partname,
            ct::PML_SLIDE_LAYOUT,
            slide_layout_xml(name, layout_type, specs).into_bytes(),
        );
        layout_part.relate_to(&master, rt::SLIDE_MASTER);
        pkg.add_part(layout_part);
    }
    master_part.relate_to(&theme, rt::THEME);
    pkg.add_part(master_part);

    let mut notes_master_part = Part::new(
        notes_master,
        ct::PML_NOTES_MASTER,
        notes_master_xml().into_bytes(),
    );
    notes_master_part.relate_to(&notes_theme, rt::THEME);
    pkg.add_part(notes_master_part);

    pkg.add_part(Part::new(theme, ct::OFC_THEME, theme_xml("Office Theme").into_bytes()));
    pkg.add_part(Part::new(notes_theme, ct::OFC_THEME, theme_xml("Office Theme").into_bytes()));

    Ok(pkg.to_bytes()?)
}

/// [`scaffold_template_titled`] with a generic title.
pub fn scaffold_template() -> Result<Vec<u8>> {
    scaffold_template_titled("Presentation")
}
