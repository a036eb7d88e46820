#[cfg(test)]
mod tests {
    use crate::codegen::PrintStyle;
    use crate::compile::{compile_component, compile_template, AdapterChoice, CompileOptions, CompileResult};
    use crate::loop_site::LoopBinding;
    use crate::record::ItemSource;
    use pretty_assertions::assert_eq;

    fn concise() -> CompileOptions {
        CompileOptions {
            style: PrintStyle::Concise,
            file_path: "List.tsx".to_string(),
            ..CompileOptions::default()
        }
    }

    fn compile(source: &str) -> CompileResult {
        compile_template(source, &concise()).unwrap()
    }

    #[test]
    fn test_item_and_index_attributes() {
        let result = compile("<View>{arr.map((val, idx) => <item data-value={val} data-key={idx} />)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((val, index0) => { return { val: val, _key: _key0, _d0: index0 }; })}",
                " a:for-item=\"val\" a:for-index=\"index0\" a:key=\"_key\">",
                "<item data-value=\"{{val.val}}\" data-key=\"{{val._d0}}\" /></block></View>"
            )
        );
        assert_eq!(result.sites.len(), 1);
        assert_eq!(result.sites[0].fields, vec!["val", "_key", "_d0"]);
        assert_eq!(result.sites[0].source, "arr");
        assert_eq!(result.next_id, 1);
    }

    #[test]
    fn test_zero_param_callback_gets_item() {
        let result = compile("<View>{[1, 2, 3].map(() => <Text>static</Text>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={[1, 2, 3].map((item, index0) => { return { item: item, _key: _key0 }; })}",
                " a:for-item=\"item\" a:for-index=\"index0\" a:key=\"_key\"><Text>static</Text></block></View>"
            )
        );
        assert_eq!(result.sites[0].fields, vec!["item", "_key"]);
    }

    #[test]
    fn test_style_object_from_leading_statement() {
        let result = compile(
            "<View>{arr.map((val, idx) => { const style = { height: idx * 100 + 'rpx' }; return <View style={style}>{val.name}</View>; })}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((val, index0) => { const style = { height: index0 * 100 + 'rpx' };",
                " return { val: val, _key: _key0, _s0: __create_style__(style), _d0: val.name }; })}",
                " a:for-item=\"val\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View style=\"{{val._s0}}\">{{ val._d0 }}</View></block></View>"
            )
        );
    }

    #[test]
    fn test_unrelated_nested_source_gets_numbered_field() {
        let result = compile(
            "<View>{arr.map(l1 => { return (<View>{list[l1].map(l2 => { return <View>{l2}</View>; })}</View>); })}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((l1, index0) => { return { l1: l1, _key: _key0,",
                " _d0: list[l1].map((l2, index1) => { return { l2: l2, _key: _key1 }; }) }; })}",
                " a:for-item=\"l1\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={_d0} a:for-item=\"l2\" a:for-index=\"index1\" a:key=\"_key\">",
                "<View>{{ l2.l2 }}</View></block></View></block></View>"
            )
        );
        assert_eq!(result.sites[1].binding, LoopBinding::Field("_d0".to_string()));
        assert_eq!(result.sites[1].parent, Some(0));
    }

    #[test]
    fn test_nested_loop_over_item_merges() {
        let result = compile(
            "<View>{arr.map(l1 => { return (<View>{l1.map(l2 => { return <View>{l2}</View>; })}</View>); })}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((l1, index0) => { return { l1: l1.map((l2, index1) => { return { l2: l2, _key: _key1 }; }),",
                " _key: _key0 }; })} a:for-item=\"l1\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={l1} a:for-item=\"l2\" a:for-index=\"index1\" a:key=\"_key\">",
                "<View>{{ l2.l2 }}</View></block></View></block></View>"
            )
        );
        assert_eq!(result.sites[0].item_source, ItemSource::Merged);
        assert_eq!(result.sites[0].fields, vec!["l1", "_key"]);
        assert_eq!(result.sites[1].binding, LoopBinding::ItemMerge);
    }

    #[test]
    fn test_nested_loop_over_item_path_shallow_merges() {
        let result = compile("<View>{arr.map(l1 => <View>{l1.list.map(l2 => <Text>{l2.name}</Text>)}</View>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((l1, index0) => { return { l1: { ...l1, list: l1.list.map((l2, index1) =>",
                " { return { l2: l2, _key: _key1, _d0: l2.name }; }) }, _key: _key0 }; })}",
                " a:for-item=\"l1\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={l1.list} a:for-item=\"l2\" a:for-index=\"index1\" a:key=\"_key\">",
                "<Text>{{ l2._d0 }}</Text></block></View></block></View>"
            )
        );
        assert_eq!(
            result.sites[0].item_source,
            ItemSource::ShallowMerged {
                paths: vec![vec!["list".to_string()]]
            }
        );
        assert_eq!(result.sites[1].binding, LoopBinding::ItemPath("l1.list".to_string()));
    }

    #[test]
    fn test_nested_loop_over_local_is_named() {
        let result = compile(
            "<View>{arr.map(l1 => { const a = l1 || []; return <View>{a.map(l2 => <Text>{l2}</Text>)}</View>; })}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((l1, index0) => { const a = l1 || [];",
                " return { l1: l1, _key: _key0, a: a.map((l2, index1) => { return { l2: l2, _key: _key1 }; }) }; })}",
                " a:for-item=\"l1\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={l1.a} a:for-item=\"l2\" a:for-index=\"index1\" a:key=\"_key\">",
                "<Text>{{ l2.l2 }}</Text></block></View></block></View>"
            )
        );
        assert_eq!(result.sites[0].fields, vec!["l1", "_key", "a"]);
        assert_eq!(result.sites[1].binding, LoopBinding::Local("a".to_string()));
    }

    #[test]
    fn test_outer_index_renamed_inside_nested_callback() {
        let result = compile(
            "<View>{arr.map((row, i) => <View>{row.cells.map(cell => <Text data-row={i}>{cell}</Text>)}</View>)}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((row, index0) => { return { row: { ...row, cells: row.cells.map((cell, index1) =>",
                " { return { cell: cell, _key: _key1, _d0: index0 }; }) }, _key: _key0 }; })}",
                " a:for-item=\"row\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={row.cells} a:for-item=\"cell\" a:for-index=\"index1\" a:key=\"_key\">",
                "<Text data-row=\"{{cell._d0}}\">{{ cell.cell }}</Text></block></View></block></View>"
            )
        );
    }

    #[test]
    fn test_page_level_and_handler_attributes_untouched() {
        let result = compile(
            "<View>{list.map(item => <Image resizeMode={resizeMode} source={{ uri: item.picUrl }} onTap={() => select(item)} />)}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={list.map((item, index0) => { return { item: item, _key: _key0, _d0: { uri: item.picUrl } }; })}",
                " a:for-item=\"item\" a:for-index=\"index0\" a:key=\"_key\">",
                "<Image resizeMode={resizeMode} source=\"{{item._d0}}\" onTap={() => select(item)} /></block></View>"
            )
        );
    }

    #[test]
    fn test_index_and_computed_index_are_separate_fields() {
        let result = compile("<View>{arr.map((val, idx) => <Text data-i={idx}>{format(idx)}</Text>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((val, index0) => { return { val: val, _key: _key0, _d0: index0, _d1: format(index0) }; })}",
                " a:for-item=\"val\" a:for-index=\"index0\" a:key=\"_key\">",
                "<Text data-i=\"{{val._d0}}\">{{ val._d1 }}</Text></block></View>"
            )
        );
    }

    #[test]
    fn test_typed_callback_parameters() {
        let result = compile("<View>{rows.map((row: Row, i: number) => <Text data-i={i}>{row.name}</Text>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={rows.map((row, index0) => { return { row: row, _key: _key0, _d0: index0, _d1: row.name }; })}",
                " a:for-item=\"row\" a:for-index=\"index0\" a:key=\"_key\">",
                "<Text data-i=\"{{row._d0}}\">{{ row._d1 }}</Text></block></View>"
            )
        );
        assert_eq!(result.sites[0].fields, vec!["row", "_key", "_d0", "_d1"]);
    }

    #[test]
    fn test_fragment_root_children_move_into_wrapper() {
        let result = compile("<View>{rows.map(r => <><Text>{r.a}</Text><Text>{r.b}</Text></>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={rows.map((r, index0) => { return { r: r, _key: _key0, _d0: r.a, _d1: r.b }; })}",
                " a:for-item=\"r\" a:for-index=\"index0\" a:key=\"_key\">",
                "<Text>{{ r._d0 }}</Text><Text>{{ r._d1 }}</Text></block></View>"
            )
        );
    }

    #[test]
    fn test_conditional_operand() {
        let result = compile("<View>{show ? list.map(x => <Text>{x}</Text>) : null}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View>{show ? <block a:for={list.map((x, index0) => { return { x: x, _key: _key0 }; })}",
                " a:for-item=\"x\" a:for-index=\"index0\" a:key=\"_key\"><Text>{{ x.x }}</Text></block> : null}</View>"
            )
        );
    }

    #[test]
    fn test_optional_map_call() {
        let result = compile("<View>{rows?.map(r => <Text>{r.name}</Text>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={rows?.map((r, index0) => { return { r: r, _key: _key0, _d0: r.name }; })}",
                " a:for-item=\"r\" a:for-index=\"index0\" a:key=\"_key\"><Text>{{ r._d0 }}</Text></block></View>"
            )
        );
        assert_eq!(result.sites[0].source, "rows");
    }

    #[test]
    fn test_nested_optional_map_call_over_item_path() {
        let result = compile("<View>{arr.map(l1 => <View>{l1.list?.map(l2 => <Text>{l2}</Text>)}</View>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={arr.map((l1, index0) => { return { l1: { ...l1, list: l1.list?.map((l2, index1) =>",
                " { return { l2: l2, _key: _key1 }; }) }, _key: _key0 }; })}",
                " a:for-item=\"l1\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View><block a:for={l1.list} a:for-item=\"l2\" a:for-index=\"index1\" a:key=\"_key\">",
                "<Text>{{ l2.l2 }}</Text></block></View></block></View>"
            )
        );
        assert_eq!(result.sites[1].binding, LoopBinding::ItemPath("l1.list".to_string()));
    }

    #[test]
    fn test_guarded_nested_loop_keeps_guard_in_record() {
        let result = compile("<View>{rows.map(v => <View>{v && v.map(x => <T>{x}</T>)}</View>)}</View>");
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={rows.map((v, index0) => { return { v: v && v.map((x, index1) =>",
                " { return { x: x, _key: _key1 }; }), _key: _key0 }; })}",
                " a:for-item=\"v\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View>{v && <block a:for={v} a:for-item=\"x\" a:for-index=\"index1\" a:key=\"_key\">",
                "<T>{{ x.x }}</T></block>}</View></block></View>"
            )
        );
        assert_eq!(result.sites[1].binding, LoopBinding::ItemMerge);
    }

    #[test]
    fn test_conditional_nested_loop_keeps_test_in_record() {
        let result = compile(
            "<View>{rows.map(r => <View>{r.open ? r.kids.map(k => <K />) : null}{r.done ? null : r.todo.map(t => <T />)}</View>)}</View>",
        );
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={rows.map((r, index0) => { return { r: { ...r,",
                " kids: r.open ? r.kids.map((k, index1) => { return { k: k, _key: _key1 }; }) : null,",
                " todo: r.done ? null : r.todo.map((t, index2) => { return { t: t, _key: _key2 }; }) }, _key: _key0 }; })}",
                " a:for-item=\"r\" a:for-index=\"index0\" a:key=\"_key\">",
                "<View>{r.open ? <block a:for={r.kids} a:for-item=\"k\" a:for-index=\"index1\" a:key=\"_key\"><K /></block> : null}",
                "{r.done ? null : <block a:for={r.todo} a:for-item=\"t\" a:for-index=\"index2\" a:key=\"_key\"><T /></block>}",
                "</View></block></View>"
            )
        );
    }

    #[test]
    fn test_guard_around_nested_element_reaches_record() {
        let result = compile(
            "<View>{rows.map(r => <View>{(r.a || r.b) && <List>{r.items.map(i => <I />)}</List>}</View>)}</View>",
        );
        assert!(result.code.contains(
            "return { r: { ...r, items: (r.a || r.b) && r.items.map((i, index1) => { return { i: i, _key: _key1 }; }) }, _key: _key0 };"
        ));
        assert!(result.code.contains("<List><block a:for={r.items} a:for-item=\"i\""));
    }

    #[test]
    fn test_start_id_and_preset_from_json() {
        let options = CompileOptions::from_json(r#"{"adapter":"wechat","startId":3,"style":"concise"}"#).unwrap();
        let result = compile_template("<View>{rows.map(r => <Text>{r}</Text>)}</View>", &options).unwrap();
        assert_eq!(
            result.code,
            concat!(
                "<View><block wx:for={rows.map((r, index3) => { return { r: r, _key: _key3 }; })}",
                " wx:for-item=\"r\" wx:for-index=\"index3\" wx:key=\"_key\"><Text>{{ r.r }}</Text></block></View>"
            )
        );
        assert_eq!(result.next_id, 4);
    }

    #[test]
    fn test_custom_adapter_from_json() {
        let options = CompileOptions::from_json(
            r#"{"adapter":{"name":"qq","forAttr":"qq:for","forItem":"qq:for-item","forIndex":"qq:for-index","key":"qq:key"},"style":"concise"}"#,
        )
        .unwrap();
        assert!(matches!(options.adapter, AdapterChoice::Custom(_)));
        let result = compile_template("<View>{rows.map(r => <Text />)}</View>", &options).unwrap();
        assert!(result.code.contains("<block qq:for={rows.map((r, index0) =>"));
        assert!(result.code.contains("qq:key=\"_key\""));
    }

    #[test]
    fn test_unknown_adapter_is_an_error() {
        let options = CompileOptions::from_json(r#"{"adapter":"swan"}"#).unwrap();
        let err = compile_template("<View />", &options).unwrap_err();
        assert_eq!(err.code, "LIST-ERR-ADAPTER");
    }

    #[test]
    fn test_pretty_output() {
        let options = CompileOptions::default();
        let result = compile_template("<View>{[1, 2, 3].map(() => <Text />)}</View>", &options).unwrap();
        assert_eq!(
            result.code,
            concat!(
                "<View><block a:for={[1, 2, 3].map((item, index0) => {\n",
                "  return {\n",
                "    item: item,\n",
                "    _key: _key0\n",
                "  };\n",
                "})} a:for-item=\"item\" a:for-index=\"index0\" a:key=\"_key\"><Text /></block></View>"
            )
        );
    }

    #[test]
    fn test_component_render_root_is_spliced() {
        let source = "export default function List({ rows }) {\n  return <View>{rows.map(r => <Text>{r.title}</Text>)}</View>;\n}\n";
        let result = compile_component(source, &concise()).unwrap();
        assert_eq!(
            result.code,
            concat!(
                "export default function List({ rows }) {\n",
                "  return <View><block a:for={rows.map((r, index0) => { return { r: r, _key: _key0, _d0: r.title }; })}",
                " a:for-item=\"r\" a:for-index=\"index0\" a:key=\"_key\"><Text>{{ r._d0 }}</Text></block></View>;\n",
                "}\n"
            )
        );
    }

    #[test]
    fn test_component_without_jsx_is_unchanged() {
        let source = "export const total = (rows) => rows.length;\n";
        let result = compile_component(source, &concise()).unwrap();
        assert_eq!(result.code, source);
        assert!(result.sites.is_empty());
    }
}
