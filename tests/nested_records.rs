//! Records embedded inside records: sizing, sub-view access, and deep
//! copies

use bumpalo::Bump;
use dynrec::{
    EitherKey, FieldList, Instance, LayoutContext, NestedKey, Record, RecordMut, RecordRef,
    SingleKey,
};

enum Item {}

struct ItemKeys {
    first: SingleKey<Item, f32>,
    second: EitherKey<Item, i32, i64>,
    third: SingleKey<Item, f32>,
}

impl Record for Item {
    const NAME: &'static str = "item";
    const FIELD_COUNT: usize = 3;
    type Keys = ItemKeys;

    fn declare(fields: &mut FieldList<Self>) -> ItemKeys {
        let wide = fields.flag("item_is_right");
        ItemKeys {
            first: fields.single("first"),
            second: fields.either("second", wide),
            third: fields.single("third"),
        }
    }
}

enum Container {}

struct ContainerKeys {
    first_item: NestedKey<Container, Item>,
    second_item: NestedKey<Container, Item>,
}

impl Record for Container {
    const NAME: &'static str = "container";
    const FIELD_COUNT: usize = 2;
    type Keys = ContainerKeys;

    fn declare(fields: &mut FieldList<Self>) -> ContainerKeys {
        ContainerKeys {
            first_item: fields.nested("first_item"),
            second_item: fields.nested("second_item"),
        }
    }
}

fn context() -> (LayoutContext, ItemKeys, ContainerKeys) {
    let mut ctx = LayoutContext::new();
    let item_keys = ctx.register::<Item>();
    let container_keys = ctx.register::<Container>();
    ctx.recompute_all().unwrap();
    (ctx, item_keys, container_keys)
}

fn fill_item(mut item: RecordMut<'_, Item>, keys: &ItemKeys, first: f32, second: i64, third: f32) {
    item.set(keys.first, first).unwrap();
    item.set_either(keys.second, second).unwrap();
    item.set(keys.third, third).unwrap();
}

fn check_item(item: &RecordRef<'_, Item>, keys: &ItemKeys, first: f32, second: i64, third: f32) {
    assert_eq!(item.get(keys.first).unwrap(), first);
    assert_eq!(item.get_either(keys.second).unwrap(), second);
    assert_eq!(item.get(keys.third).unwrap(), third);
}

#[test]
fn outer_total_includes_the_inner_dynamic_size() {
    let (mut ctx, _, _) = context();

    // narrow arm: item is 4 + 4 + 4
    assert_eq!(ctx.dynamic_size::<Item>().unwrap(), 12);
    assert_eq!(ctx.dynamic_size::<Container>().unwrap(), 24);

    let wide = ctx.define_flag("item_is_right");
    ctx.set_flag(wide, true);
    ctx.recompute_all().unwrap();

    assert_eq!(ctx.dynamic_size::<Item>().unwrap(), 16);
    assert_eq!(ctx.dynamic_size::<Container>().unwrap(), 32);
}

#[test]
fn items_copied_into_a_container_read_back_through_sub_views() {
    let (ctx, item_keys, container_keys) = context();
    let arena = Bump::new();

    let mut first = Instance::<Item>::construct_in_arena(&ctx, &arena).unwrap();
    fill_item(first.fields_mut(), &item_keys, 12.0, 128, 45.0);
    check_item(&first.fields(), &item_keys, 12.0, 128, 45.0);

    let mut second = Instance::<Item>::construct_in_arena(&ctx, &arena).unwrap();
    fill_item(second.fields_mut(), &item_keys, 64.0, 256, 113.0);

    let mut container = Instance::<Container>::construct_in_arena(&ctx, &arena).unwrap();
    container
        .fields_mut()
        .nested_mut(container_keys.first_item)
        .copy_from(&first.fields())
        .unwrap();
    container
        .fields_mut()
        .nested_mut(container_keys.second_item)
        .copy_from(&second.fields())
        .unwrap();

    check_item(
        &container.fields().nested(container_keys.first_item),
        &item_keys,
        12.0,
        128,
        45.0,
    );
    check_item(
        &container.fields().nested(container_keys.second_item),
        &item_keys,
        64.0,
        256,
        113.0,
    );
}

#[test]
fn writes_through_sub_views_land_in_the_outer_region() {
    let (ctx, item_keys, container_keys) = context();
    let mut container = Instance::<Container>::allocate(&ctx).unwrap();

    fill_item(
        container.fields_mut().nested_mut(container_keys.second_item),
        &item_keys,
        1.0,
        2,
        3.0,
    );

    // the first item is untouched
    check_item(
        &container.fields().nested(container_keys.first_item),
        &item_keys,
        0.0,
        0,
        0.0,
    );
    check_item(
        &container.fields().nested(container_keys.second_item),
        &item_keys,
        1.0,
        2,
        3.0,
    );
}

#[test]
fn copying_the_outer_record_deep_copies_the_inner_ones() {
    let (ctx, item_keys, container_keys) = context();

    let mut original = Instance::<Container>::allocate(&ctx).unwrap();
    fill_item(
        original.fields_mut().nested_mut(container_keys.first_item),
        &item_keys,
        12.0,
        128,
        45.0,
    );
    fill_item(
        original.fields_mut().nested_mut(container_keys.second_item),
        &item_keys,
        64.0,
        256,
        113.0,
    );

    let mut copy = Instance::<Container>::allocate(&ctx).unwrap();
    copy.copy_from(&original).unwrap();

    // mutate the original afterwards; the copy must not follow
    fill_item(
        original.fields_mut().nested_mut(container_keys.first_item),
        &item_keys,
        0.5,
        1,
        0.5,
    );

    check_item(
        &copy.fields().nested(container_keys.first_item),
        &item_keys,
        12.0,
        128,
        45.0,
    );
    check_item(
        &copy.fields().nested(container_keys.second_item),
        &item_keys,
        64.0,
        256,
        113.0,
    );
}

#[test]
fn nested_field_copy_moves_one_embedded_record() {
    let (ctx, item_keys, container_keys) = context();

    let mut a = Instance::<Container>::allocate(&ctx).unwrap();
    fill_item(
        a.fields_mut().nested_mut(container_keys.first_item),
        &item_keys,
        9.0,
        99,
        999.0,
    );

    let mut b = Instance::<Container>::allocate(&ctx).unwrap();
    b.fields_mut()
        .copy_field_from(container_keys.first_item, &a.fields())
        .unwrap();

    check_item(
        &b.fields().nested(container_keys.first_item),
        &item_keys,
        9.0,
        99,
        999.0,
    );
    check_item(
        &b.fields().nested(container_keys.second_item),
        &item_keys,
        0.0,
        0,
        0.0,
    );
}
