//! Provisioning SQL for the hosted backend.

/// SQL creating the catalog table, its row-level security policies, and the
/// public image bucket. Every statement is safe to re-run.
pub fn schema_sql(table: &str, bucket: &str) -> String {
    format!(
        r#"-- Catalog table
CREATE TABLE IF NOT EXISTS public.{table} (
    id uuid DEFAULT gen_random_uuid() PRIMARY KEY,
    created_at timestamptz DEFAULT now(),
    name text,
    image_path text,
    category text,
    tags text[],
    status text DEFAULT 'processing',
    ai_data jsonb
);

ALTER TABLE public.{table} ENABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS "Enable read access for all users" ON public.{table};
CREATE POLICY "Enable read access for all users" ON public.{table} FOR SELECT TO public USING (true);

DROP POLICY IF EXISTS "Enable insert access for all users" ON public.{table};
CREATE POLICY "Enable insert access for all users" ON public.{table} FOR INSERT TO public WITH CHECK (true);

DROP POLICY IF EXISTS "Enable update access for all users" ON public.{table};
CREATE POLICY "Enable update access for all users" ON public.{table} FOR UPDATE TO public USING (true);

DROP POLICY IF EXISTS "Enable delete access for all users" ON public.{table};
CREATE POLICY "Enable delete access for all users" ON public.{table} FOR DELETE TO public USING (true);

-- Image bucket
INSERT INTO storage.buckets (id, name, public)
VALUES ('{bucket}', '{bucket}', true)
ON CONFLICT (id) DO NOTHING;

DROP POLICY IF EXISTS "Public Access" ON storage.objects;
CREATE POLICY "Public Access" ON storage.objects FOR SELECT USING ( bucket_id = '{bucket}' );

DROP POLICY IF EXISTS "Public Upload" ON storage.objects;
CREATE POLICY "Public Upload" ON storage.objects FOR INSERT WITH CHECK ( bucket_id = '{bucket}' );
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_substituted() {
        let sql = schema_sql("closet", "closet_photos");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS public.closet ("));
        assert!(sql.contains("VALUES ('closet_photos', 'closet_photos', true)"));
        assert!(sql.contains("status text DEFAULT 'processing'"));
        assert!(!sql.contains("{table}"));
    }
}
